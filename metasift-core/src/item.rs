use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ident::Identifier;

/// One item to organize: an identifier plus the media files that belong to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieItem {
    pub id: Identifier,
    #[serde(default)]
    pub files: Vec<PathBuf>,
    /// The video has burned-in subtitles.
    #[serde(default)]
    pub hard_sub: bool,
    /// The video is an uncensored leak.
    #[serde(default)]
    pub uncensored: bool,
}

impl MovieItem {
    pub fn new(id: Identifier) -> Self {
        Self {
            id,
            files: Vec::new(),
            hard_sub: false,
            uncensored: false,
        }
    }

    pub fn with_files(mut self, files: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Suffix appended to the catalog number in generated names.
    pub fn attr_str(&self) -> &'static str {
        match (self.uncensored, self.hard_sub) {
            (true, true) => "-UC",
            (true, false) => "-U",
            (false, true) => "-C",
            (false, false) => "",
        }
    }

    /// The longest extension among the media files, including the dot.
    pub fn longest_ext(&self) -> String {
        self.files
            .iter()
            .filter_map(|f| f.extension())
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .max_by_key(|ext| ext.chars().count())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_suffixes() {
        let mut item = MovieItem::new(Identifier::normal("ABC-123"));
        assert_eq!(item.attr_str(), "");
        item.hard_sub = true;
        assert_eq!(item.attr_str(), "-C");
        item.uncensored = true;
        assert_eq!(item.attr_str(), "-UC");
        item.hard_sub = false;
        assert_eq!(item.attr_str(), "-U");
    }

    #[test]
    fn longest_extension() {
        let item = MovieItem::new(Identifier::normal("ABC-123"))
            .with_files(["/v/a.mp4", "/v/a.rmvb", "/v/noext"]);
        assert_eq!(item.longest_ext(), ".rmvb");
        assert_eq!(MovieItem::new(Identifier::normal("X-1")).longest_ext(), "");
    }
}
