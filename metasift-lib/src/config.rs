//! Run configuration, loaded once from TOML and passed by reference.
//!
//! The file lives at `~/.config/metasift/config.toml` unless overridden
//! on the command line or by `METASIFT_CONFIG`. Every section has defaults,
//! so a missing file or a partial file is fine.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use metasift_core::Field;
use metasift_crawl::{DispatchOptions, SourceEndpoint, SourceSelection};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::template::Template;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "METASIFT_CONFIG";

/// Canonical config location: `~/.config/metasift/config.toml`.
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

fn config_dir() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("metasift")
}

/// Resolve the config file path:
///
/// 1. CLI override (if `Some`)
/// 2. `METASIFT_CONFIG`
/// 3. [`default_config_path`]
pub fn resolve_config_path(cli_override: Option<PathBuf>) -> PathBuf {
    if let Some(p) = cli_override {
        return p;
    }
    match std::env::var_os(CONFIG_ENV) {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => default_config_path(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub crawler: CrawlerConfig,
    pub summarizer: SummarizerConfig,
    /// JSON endpoint sources, keyed by source name.
    pub sources: BTreeMap<String, SourceEndpoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Attempts per source.
    pub retry: u32,
    /// Seconds allowed for one attempt.
    pub timeout_secs: u64,
    /// Linear backoff between attempts, in milliseconds.
    pub retry_backoff_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            retry: 3,
            timeout_secs: 10,
            retry_backoff_ms: 0,
        }
    }
}

/// How to treat the cover of the source known to watermark its images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverPolicy {
    /// Keep it in place.
    Yes,
    /// Drop it.
    No,
    /// Move it to the end of the list.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    pub selection: SourceSelection,
    /// Fields that must be present for an item to be organized.
    pub required_keys: Vec<Field>,
    /// Take the catalog number most sources agree on.
    pub respect_site_id: bool,
    /// Source whose genre list replaces the merged one.
    pub genre_source: Option<String>,
    /// Source whose covers carry a watermark.
    pub watermarked_cover_source: Option<String>,
    pub watermarked_cover: CoverPolicy,
    pub normalize_actress_name: bool,
    /// Actress alias file. Defaults to `actress_alias.json` next to the config.
    pub alias_file: Option<PathBuf>,
    /// Items processed at the same time in a batch.
    pub max_items_in_flight: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            selection: SourceSelection::default(),
            required_keys: vec![Field::Cover, Field::Title],
            respect_site_id: true,
            genre_source: Some("javdb".to_string()),
            watermarked_cover_source: Some("javdb".to_string()),
            watermarked_cover: CoverPolicy::Fallback,
            normalize_actress_name: true,
            alias_file: None,
            max_items_in_flight: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CensorLabels {
    pub uncensored: String,
    pub censored: String,
    pub unknown: String,
}

impl Default for CensorLabels {
    fn default() -> Self {
        Self {
            uncensored: "无码".to_string(),
            censored: "有码".to_string(),
            unknown: "打码情况未知".to_string(),
        }
    }
}

/// Substitutes for empty name values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultValues {
    pub title: String,
    pub actress: String,
    pub serial: String,
    pub director: String,
    pub producer: String,
    pub publisher: String,
}

impl Default for DefaultValues {
    fn default() -> Self {
        Self {
            title: "#未知标题".to_string(),
            actress: "#未知女优".to_string(),
            serial: "#未知系列".to_string(),
            director: "#未知导演".to_string(),
            producer: "#未知制作商".to_string(),
            publisher: "#未知发行商".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub output_folder_pattern: Template,
    pub basename_pattern: Template,
    /// Longest allowed absolute path.
    pub length_maximum: usize,
    /// Count bytes instead of characters.
    pub length_by_byte: bool,
    pub max_actress_count: usize,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            output_folder_pattern: Template::builtin("#整理完成/{actress}/[{num}] {title}"),
            basename_pattern: Template::builtin("{num}"),
            length_maximum: 250,
            length_by_byte: false,
            max_actress_count: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NfoConfig {
    pub basename_pattern: Template,
    pub title_pattern: Template,
}

impl Default for NfoConfig {
    fn default() -> Self {
        Self {
            basename_pattern: Template::builtin("movie"),
            title_pattern: Template::builtin("{num} {title}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasenameConfig {
    pub basename_pattern: Template,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Relocate media into the templated folder. When false, output files
    /// go next to the first media file.
    pub move_files: bool,
    pub remove_trailing_actor_name: bool,
    pub censor_labels: CensorLabels,
    pub defaults: DefaultValues,
    pub path: PathConfig,
    pub nfo: NfoConfig,
    pub cover: BasenameConfig,
    pub fanart: BasenameConfig,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            move_files: true,
            remove_trailing_actor_name: true,
            censor_labels: CensorLabels::default(),
            defaults: DefaultValues::default(),
            path: PathConfig::default(),
            nfo: NfoConfig::default(),
            cover: BasenameConfig {
                basename_pattern: Template::builtin("poster"),
            },
            fanart: BasenameConfig {
                basename_pattern: Template::builtin("fanart"),
            },
        }
    }
}

impl Config {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::io(path, e)),
        };
        let config: Config = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<string>"),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that parse fine but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.timeout_secs == 0 {
            return Err(ConfigError::invalid("network.timeout_secs", "must be positive"));
        }
        if self.summarizer.path.length_maximum == 0 {
            return Err(ConfigError::invalid(
                "summarizer.path.length_maximum",
                "must be positive",
            ));
        }
        if self.summarizer.path.max_actress_count == 0 {
            return Err(ConfigError::invalid(
                "summarizer.path.max_actress_count",
                "must be at least 1",
            ));
        }
        if self.crawler.max_items_in_flight == 0 {
            return Err(ConfigError::invalid(
                "crawler.max_items_in_flight",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the config to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let serialized = self.to_toml_string()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, serialized).map_err(|e| ConfigError::io(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| ConfigError::io(path, e))?;
        Ok(())
    }

    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            retry: self.network.retry,
            timeout: Duration::from_secs(self.network.timeout_secs),
            backoff: Duration::from_millis(self.network.retry_backoff_ms),
        }
    }

    pub fn alias_file(&self) -> PathBuf {
        self.crawler
            .alias_file
            .clone()
            .unwrap_or_else(|| config_dir().join("actress_alias.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.network.retry, 3);
        assert_eq!(config.crawler.required_keys, vec![Field::Cover, Field::Title]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [network]
            retry = 5

            [crawler]
            watermarked_cover = "no"
            required_keys = ["title", "ori_title"]

            [crawler.selection]
            normal = ["javbus"]

            [summarizer.path]
            length_by_byte = true
            output_folder_pattern = "out/{num}"

            [sources.local]
            endpoint = "http://localhost:8080/{id}"
            "#,
        )
        .unwrap();
        assert_eq!(config.network.retry, 5);
        assert_eq!(config.network.timeout_secs, 10);
        assert_eq!(config.crawler.watermarked_cover, CoverPolicy::No);
        assert_eq!(config.crawler.required_keys, vec![Field::Title, Field::OriTitle]);
        assert_eq!(config.crawler.selection.normal, vec!["javbus"]);
        assert_eq!(config.crawler.selection.cid, vec!["fanza"]);
        assert!(config.summarizer.path.length_by_byte);
        assert_eq!(config.summarizer.path.output_folder_pattern.as_str(), "out/{num}");
        assert_eq!(config.summarizer.path.length_maximum, 250);
        assert!(config.sources.contains_key("local"));
    }

    #[test]
    fn bad_templates_and_fields_are_rejected() {
        assert!(
            Config::from_toml_str("[summarizer.nfo]\ntitle_pattern = \"{bogus}\"").is_err()
        );
        assert!(Config::from_toml_str("[crawler]\nrequired_keys = [\"colour\"]").is_err());
        assert!(Config::from_toml_str("[summarizer.path]\nlength_maximum = 0").is_err());
    }

    #[test]
    fn load_missing_file_and_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        assert_eq!(Config::load(&path).unwrap(), Config::default());

        let mut config = Config::default();
        config.network.retry = 7;
        config.summarizer.move_files = false;
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn cli_override_wins() {
        let p = resolve_config_path(Some(PathBuf::from("/tmp/x.toml")));
        assert_eq!(p, PathBuf::from("/tmp/x.toml"));
    }

    #[test]
    fn dispatch_options_from_network() {
        let mut config = Config::default();
        config.network.retry_backoff_ms = 250;
        let opts = config.dispatch_options();
        assert_eq!(opts.retry, 3);
        assert_eq!(opts.timeout, Duration::from_secs(10));
        assert_eq!(opts.backoff, Duration::from_millis(250));
    }
}
