use serde::{Deserialize, Serialize};

/// Catalog number families.
///
/// The kind decides which configured sources are eligible for an
/// identifier, and whether a content id may fall back to the normal-id
/// sources during dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdKind {
    Normal,
    Fc2,
    Cid,
    Getchu,
    Gyutto,
}

/// All kinds in configuration order.
const ALL_KINDS: &[IdKind] = &[
    IdKind::Normal,
    IdKind::Fc2,
    IdKind::Cid,
    IdKind::Getchu,
    IdKind::Gyutto,
];

impl IdKind {
    /// Name used in configuration files and on the command line.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Fc2 => "fc2",
            Self::Cid => "cid",
            Self::Getchu => "getchu",
            Self::Gyutto => "gyutto",
        }
    }

    /// Human readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Normal => "Normal catalog number",
            Self::Fc2 => "FC2 number",
            Self::Cid => "Content id",
            Self::Getchu => "Getchu number",
            Self::Gyutto => "Gyutto number",
        }
    }

    pub fn all() -> &'static [IdKind] {
        ALL_KINDS
    }
}

impl std::fmt::Display for IdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Error returned when a string cannot be parsed into an `IdKind`.
#[derive(Debug, Clone)]
pub struct IdKindParseError(pub String);

impl std::fmt::Display for IdKindParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown identifier kind: '{}'", self.0)
    }
}

impl std::error::Error for IdKindParseError {}

impl std::str::FromStr for IdKind {
    type Err = IdKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        ALL_KINDS
            .iter()
            .copied()
            .find(|kind| kind.short_name() == lower)
            .ok_or_else(|| IdKindParseError(s.to_string()))
    }
}

/// A media catalog identifier.
///
/// Content ids may carry a normal id derived from their shape; the crawl
/// dispatcher uses it to query the normal-id sources as well and decides
/// afterwards which family the item really belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Normal(String),
    Fc2(String),
    Cid { cid: String, dvdid: Option<String> },
    Getchu(String),
    Gyutto(String),
}

impl Identifier {
    /// A normal catalog number such as `ABC-123`.
    pub fn normal(dvdid: impl Into<String>) -> Self {
        Self::Normal(dvdid.into().trim().to_uppercase())
    }

    /// A content id, deriving the normal id from it when possible.
    pub fn cid(cid: impl Into<String>) -> Self {
        let cid = cid.into().trim().to_lowercase();
        let dvdid = derive_dvdid(&cid);
        Self::Cid { cid, dvdid }
    }

    pub fn kind(&self) -> IdKind {
        match self {
            Self::Normal(_) => IdKind::Normal,
            Self::Fc2(_) => IdKind::Fc2,
            Self::Cid { .. } => IdKind::Cid,
            Self::Getchu(_) => IdKind::Getchu,
            Self::Gyutto(_) => IdKind::Gyutto,
        }
    }

    /// The normal-style catalog number, if the identifier has one.
    pub fn dvdid(&self) -> Option<&str> {
        match self {
            Self::Normal(id) | Self::Fc2(id) | Self::Getchu(id) | Self::Gyutto(id) => Some(id),
            Self::Cid { dvdid, .. } => dvdid.as_deref(),
        }
    }

    pub fn content_id(&self) -> Option<&str> {
        match self {
            Self::Cid { cid, .. } => Some(cid),
            _ => None,
        }
    }

    /// The number used in names and logs: the normal id when present,
    /// otherwise the content id.
    pub fn num(&self) -> &str {
        match self {
            Self::Cid { cid, dvdid } => dvdid.as_deref().unwrap_or(cid),
            _ => self.dvdid().unwrap_or_default(),
        }
    }

    /// The normal identifier a content id can fall back to.
    pub fn fallback_normal(&self) -> Option<Identifier> {
        match self {
            Self::Cid {
                dvdid: Some(dvdid), ..
            } => Some(Self::Normal(dvdid.clone())),
            _ => None,
        }
    }

    /// The same identifier with any derived normal id dropped.
    pub fn without_fallback(&self) -> Identifier {
        match self {
            Self::Cid { cid, .. } => Self::Cid {
                cid: cid.clone(),
                dvdid: None,
            },
            other => other.clone(),
        }
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cid { cid, dvdid: Some(dvdid) } => write!(f, "{} (cid:{})", dvdid, cid),
            Self::Cid { cid, dvdid: None } => write!(f, "cid:{}", cid),
            _ => write!(f, "{}", self.num()),
        }
    }
}

/// Error returned when a string is not a usable identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierParseError(pub String);

impl std::fmt::Display for IdentifierParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "not a catalog number: '{}'", self.0)
    }
}

impl std::error::Error for IdentifierParseError {}

impl std::str::FromStr for Identifier {
    type Err = IdentifierParseError;

    /// Parse user input.
    ///
    /// `cid:` / `cid=` select a content id, `getchu:` and `gyutto:` select
    /// those shops, anything starting with `fc2` is an FC2 number, and the
    /// rest is taken as a normal catalog number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_lowercase();
        let err = || IdentifierParseError(s.to_string());

        if let Some(rest) = strip_tag(&lower, "cid") {
            if rest.is_empty() {
                return Err(err());
            }
            return Ok(Self::cid(rest));
        }
        if let Some(rest) = strip_tag(&lower, "getchu") {
            return shop_number(rest, "GETCHU").map(Self::Getchu).ok_or_else(err);
        }
        if let Some(rest) = strip_tag(&lower, "gyutto") {
            return shop_number(rest, "GYUTTO").map(Self::Gyutto).ok_or_else(err);
        }
        if let Some(rest) = lower.strip_prefix("fc2") {
            let rest = rest.trim_start_matches(['-', '_', ' ']);
            let rest = rest.strip_prefix("ppv").unwrap_or(rest);
            let digits = rest.trim_start_matches(['-', '_', ' ']);
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(err());
            }
            return Ok(Self::Fc2(format!("FC2-{}", digits)));
        }
        if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
            return Err(err());
        }
        Ok(Self::normal(trimmed))
    }
}

/// Serialized form. Identifiers read back exactly as written: the text form
/// goes through `FromStr`, and a content id whose derived normal id was
/// dropped by the dispatcher is written as a table so it stays settled.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum IdentifierRepr {
    Text(String),
    Settled { cid: String, dvdid: Option<String> },
}

impl IdentifierRepr {
    fn into_identifier(self) -> Result<Identifier, IdentifierParseError> {
        match self {
            IdentifierRepr::Text(text) => text.parse(),
            IdentifierRepr::Settled { cid, dvdid } => {
                let cid = cid.trim().to_lowercase();
                if cid.is_empty() {
                    return Err(IdentifierParseError(cid));
                }
                Ok(Identifier::Cid { cid, dvdid })
            }
        }
    }

    fn of(id: &Identifier) -> Self {
        match id.clone() {
            Identifier::Cid { cid, dvdid } if dvdid != derive_dvdid(&cid) => {
                IdentifierRepr::Settled { cid, dvdid }
            }
            Identifier::Cid { cid, .. } => IdentifierRepr::Text(format!("cid:{}", cid)),
            Identifier::Getchu(id) | Identifier::Gyutto(id) => {
                // "GETCHU-123" -> "getchu:123"
                IdentifierRepr::Text(match id.split_once('-') {
                    Some((shop, number)) => format!("{}:{}", shop.to_lowercase(), number),
                    None => id,
                })
            }
            other => IdentifierRepr::Text(other.num().to_string()),
        }
    }
}

impl Serialize for Identifier {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        IdentifierRepr::of(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IdentifierRepr::deserialize(deserializer)?
            .into_identifier()
            .map_err(serde::de::Error::custom)
    }
}

fn strip_tag<'a>(lower: &'a str, tag: &str) -> Option<&'a str> {
    let rest = lower.strip_prefix(tag)?;
    rest.strip_prefix(':')
        .or_else(|| rest.strip_prefix('='))
        .map(str::trim)
}

fn shop_number(rest: &str, shop: &str) -> Option<String> {
    let number = rest.trim_start_matches(['-', '_']);
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(format!("{}-{}", shop, number.to_uppercase()))
}

/// Derive a normal catalog number from a content id.
///
/// Content ids look like `[digits]letters digits[letter]`, e.g.
/// `118abp00123` → `ABP-123`. The number keeps at least three digits.
/// Returns `None` for anything that does not have that shape.
pub fn derive_dvdid(cid: &str) -> Option<String> {
    let rest = cid.trim_start_matches(|c: char| c.is_ascii_digit());
    let letters_end = rest
        .find(|c: char| !c.is_ascii_lowercase())
        .unwrap_or(rest.len());
    let (letters, rest) = rest.split_at(letters_end);
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (digits, tail) = rest.split_at(digits_end);

    if letters.len() < 2 || digits.is_empty() {
        return None;
    }
    if tail.len() > 1 || !tail.chars().all(|c| c.is_ascii_lowercase()) {
        return None;
    }

    let number = digits.trim_start_matches('0');
    Some(format!("{}-{:0>3}", letters.to_uppercase(), number))
}

#[cfg(test)]
#[path = "tests/ident_tests.rs"]
mod tests;
