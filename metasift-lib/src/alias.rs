//! Actress alias store: canonical name to known aliases.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Read-only during a run. Stored on disk as `{"canonical": ["alias", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasMap {
    names: BTreeMap<String, BTreeSet<String>>,
}

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<I, S>(&mut self, canonical: impl Into<String>, aliases: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names
            .entry(canonical.into())
            .or_default()
            .extend(aliases.into_iter().map(Into::into));
        self
    }

    /// The canonical name for `name`, or `name` itself when it is not a
    /// known alias.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.names
            .iter()
            .find(|(_, aliases)| aliases.contains(name))
            .map(|(canonical, _)| canonical.as_str())
            .unwrap_or(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::Alias {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load the alias file, writing an empty one first if it does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("Creating empty alias file at {}", path.display());
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
            }
            std::fs::write(path, "{}\n").map_err(|e| ConfigError::io(path, e))?;
            return Ok(Self::default());
        }
        let map = Self::load(path)?;
        log::debug!("Loaded {} alias entries from {}", map.len(), path.display());
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_aliases_only() {
        let mut map = AliasMap::new();
        map.insert("Jane Doe", ["J. Doe", "Janey"]);
        assert_eq!(map.resolve("Janey"), "Jane Doe");
        assert_eq!(map.resolve("Jane Doe"), "Jane Doe");
        assert_eq!(map.resolve("Someone"), "Someone");
    }

    #[test]
    fn load_or_create_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("alias.json");
        let map = AliasMap::load_or_create(&path).unwrap();
        assert!(map.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "{}");
    }

    #[test]
    fn loads_json_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alias.json");
        std::fs::write(&path, r#"{"Jane": ["Janey", "J"]}"#).unwrap();
        let map = AliasMap::load_or_create(&path).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.resolve("J"), "Jane");

        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            AliasMap::load(&path),
            Err(ConfigError::Alias { .. })
        ));
    }
}
