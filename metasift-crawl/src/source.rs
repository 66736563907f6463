//! Source adapter contract and the registry of configured sources.

use std::sync::Arc;

use async_trait::async_trait;
use metasift_core::{IdKind, Identifier, MovieInfo};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// One external metadata provider.
///
/// Implementations turn an identifier into whatever fields the provider
/// knows about, or a classified [`FetchError`]. They never see each
/// other's results.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Name used in source selection lists and logs.
    fn name(&self) -> &str;

    /// Adapters that retry internally are invoked once per identifier.
    fn self_retrying(&self) -> bool {
        false
    }

    async fn fetch(&self, id: &Identifier) -> Result<MovieInfo, FetchError>;
}

/// All adapters available to the dispatcher, looked up by name.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Arc<dyn SourceAdapter>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter. A later adapter with the same name replaces the
    /// earlier one.
    pub fn register<S: SourceAdapter + 'static>(&mut self, source: S) -> &mut Self {
        self.register_arc(Arc::new(source))
    }

    pub fn register_arc(&mut self, source: Arc<dyn SourceAdapter>) -> &mut Self {
        self.sources.retain(|s| s.name() != source.name());
        self.sources.push(source);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn SourceAdapter>> {
        self.sources.iter().find(|s| s.name() == name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.iter().any(|s| s.name() == name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("sources", &self.names())
            .finish()
    }
}

/// Ordered source names per identifier kind. Order is priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSelection {
    pub normal: Vec<String>,
    pub fc2: Vec<String>,
    pub cid: Vec<String>,
    pub getchu: Vec<String>,
    pub gyutto: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for SourceSelection {
    fn default() -> Self {
        Self {
            normal: names(&[
                "airav", "avsox", "javbus", "javdb", "javlib", "jav321", "mgstage", "prestige",
            ]),
            fc2: names(&["fc2", "avsox", "javdb", "javmenu", "fc2ppvdb"]),
            cid: names(&["fanza"]),
            getchu: names(&["dl_getchu"]),
            gyutto: names(&["gyutto"]),
        }
    }
}

impl SourceSelection {
    /// Source names eligible for `kind`, in priority order.
    pub fn for_kind(&self, kind: IdKind) -> &[String] {
        match kind {
            IdKind::Normal => &self.normal,
            IdKind::Fc2 => &self.fc2,
            IdKind::Cid => &self.cid,
            IdKind::Getchu => &self.getchu,
            IdKind::Gyutto => &self.gyutto,
        }
    }

    /// Every distinct name mentioned by any kind.
    pub fn all_names(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for kind in IdKind::all() {
            for name in self.for_kind(*kind) {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str, bool);

    #[async_trait]
    impl SourceAdapter for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn self_retrying(&self) -> bool {
            self.1
        }

        async fn fetch(&self, _id: &Identifier) -> Result<MovieInfo, FetchError> {
            Err(FetchError::NotFound)
        }
    }

    #[test]
    fn register_replaces_same_name() {
        let mut reg = SourceRegistry::new();
        reg.register(Named("a", false))
            .register(Named("b", false))
            .register(Named("a", true));
        assert_eq!(reg.names(), vec!["b", "a"]);
        assert!(reg.get("a").unwrap().self_retrying());
        assert!(reg.get("missing").is_none());
    }

    #[test]
    fn selection_by_kind() {
        let sel = SourceSelection::default();
        assert_eq!(sel.for_kind(IdKind::Cid), ["fanza".to_string()]);
        assert_eq!(sel.for_kind(IdKind::Normal)[0], "airav");
        let all = sel.all_names();
        assert_eq!(all.iter().filter(|n| **n == "avsox").count(), 1);
    }

    #[test]
    fn selection_overrides_one_kind() {
        let sel: SourceSelection = serde_json::from_str(r#"{"normal": ["x", "y"]}"#).unwrap();
        assert_eq!(sel.normal, vec!["x", "y"]);
        assert_eq!(sel.cid, vec!["fanza"]);
    }
}
