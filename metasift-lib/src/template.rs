//! Naming templates: `{key}` placeholders with `{{` / `}}` escapes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TemplateError;

/// Placeholders a template may use.
pub const NAME_KEYS: &[&str] = &[
    "num",
    "title",
    "rawtitle",
    "actress",
    "score",
    "censor",
    "serial",
    "director",
    "producer",
    "publisher",
    "date",
    "year",
    "label",
    "genre",
];

/// Values substituted into templates, keyed by placeholder name.
pub type NameVars = BTreeMap<&'static str, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Text(String),
    Key(&'static str),
}

/// A parsed template. Unknown placeholders are rejected at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Template {
    source: String,
    parts: Vec<Part>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut parts = Vec::new();
        let mut text = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    text.push('{');
                }
                '{' => {
                    let mut key = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(k) => key.push(k),
                            None => return Err(TemplateError::Unclosed(source.to_string())),
                        }
                    }
                    let key = key.trim();
                    let known = NAME_KEYS.iter().find(|k| **k == key).ok_or_else(|| {
                        TemplateError::UnknownKey {
                            key: key.to_string(),
                            template: source.to_string(),
                        }
                    })?;
                    if !text.is_empty() {
                        parts.push(Part::Text(std::mem::take(&mut text)));
                    }
                    parts.push(Part::Key(known));
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    text.push('}');
                }
                '}' => return Err(TemplateError::Unmatched(source.to_string())),
                other => text.push(other),
            }
        }
        if !text.is_empty() {
            parts.push(Part::Text(text));
        }

        Ok(Self {
            source: source.to_string(),
            parts,
        })
    }

    /// A template known to be valid. Used for built-in defaults.
    pub(crate) fn builtin(source: &'static str) -> Self {
        Self::parse(source).unwrap_or_else(|_| Self {
            source: source.to_string(),
            parts: vec![Part::Text(source.to_string())],
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholders used by this template, in order of appearance.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.parts.iter().filter_map(|p| match p {
            Part::Key(k) => Some(*k),
            Part::Text(_) => None,
        })
    }

    /// Fill in the placeholders. Missing values render as empty strings.
    pub fn render(&self, vars: &NameVars) -> String {
        let mut out = String::with_capacity(self.source.len() * 2);
        for part in &self.parts {
            match part {
                Part::Text(t) => out.push_str(t),
                Part::Key(k) => {
                    if let Some(v) = vars.get(k) {
                        out.push_str(v);
                    }
                }
            }
        }
        out
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for Template {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Template {
    type Error = TemplateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Template> for String {
    fn from(t: Template) -> Self {
        t.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&'static str, &str)]) -> NameVars {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn renders_placeholders() {
        let t = Template::parse("#done/{actress}/[{num}] {title}").unwrap();
        let out = t.render(&vars(&[
            ("actress", "Jane"),
            ("num", "ABC-123"),
            ("title", "Foo"),
        ]));
        assert_eq!(out, "#done/Jane/[ABC-123] Foo");
        assert_eq!(t.keys().collect::<Vec<_>>(), vec!["actress", "num", "title"]);
    }

    #[test]
    fn escapes_and_missing_values() {
        let t = Template::parse("{{{num}}}-{label}").unwrap();
        assert_eq!(t.render(&vars(&[("num", "X-1")])), "{X-1}-");
    }

    #[test]
    fn rejects_bad_templates() {
        assert!(matches!(
            Template::parse("{nope}"),
            Err(TemplateError::UnknownKey { ref key, .. }) if key == "nope"
        ));
        assert!(matches!(
            Template::parse("{title"),
            Err(TemplateError::Unclosed(_))
        ));
        assert!(matches!(
            Template::parse("title}"),
            Err(TemplateError::Unmatched(_))
        ));
    }

    #[test]
    fn deserializes_from_string() {
        let t: Template = serde_json::from_str(r#""{num} {title}""#).unwrap();
        assert_eq!(t.as_str(), "{num} {title}");
        assert!(serde_json::from_str::<Template>(r#""{bogus}""#).is_err());
    }
}
