use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ident::Identifier;
use crate::outcome::FailureKind;

/// Metadata fields shared by per-source records and the final record.
///
/// Every field may be empty. What counts as empty is defined per field in
/// [`crate::field`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieInfo {
    /// Normal catalog number as reported by the source.
    pub dvdid: Option<String>,
    /// Content id as reported by the source.
    pub cid: Option<String>,
    /// Page the data came from.
    pub url: Option<String>,

    pub title: Option<String>,
    pub ori_title: Option<String>,
    pub plot: Option<String>,
    pub cover: Option<String>,
    pub big_cover: Option<String>,
    pub genre: Vec<String>,
    pub genre_id: Vec<String>,
    pub score: Option<String>,
    pub actress: Vec<String>,
    /// Actress name to picture URL.
    pub actress_pics: BTreeMap<String, String>,
    pub director: Option<String>,
    /// Runtime in minutes.
    pub duration: Option<u32>,
    pub producer: Option<String>,
    pub publisher: Option<String>,
    pub serial: Option<String>,
    /// `None` means the source did not say.
    pub uncensored: Option<bool>,
    pub publish_date: Option<NaiveDate>,
    pub preview_pics: Vec<String>,
    pub preview_video: Option<String>,
    pub magnet: Option<String>,
}

impl MovieInfo {
    /// An empty record seeded with the identifier's canonical ids.
    pub fn seeded(id: &Identifier) -> Self {
        Self {
            dvdid: id.dvdid().map(str::to_string),
            cid: id.content_id().map(str::to_string),
            ..Self::default()
        }
    }

    pub fn has_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

/// Crawl outcome attached to a [`PartialRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CrawlOutcome {
    #[default]
    Pending,
    Success,
    Failed { kind: FailureKind, message: String },
}

/// One source's answer for one identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialRecord {
    pub source: String,
    pub info: MovieInfo,
    pub outcome: CrawlOutcome,
}

impl PartialRecord {
    /// An empty record for `source`, waiting for its adapter to run.
    pub fn new(source: impl Into<String>, id: &Identifier) -> Self {
        Self {
            source: source.into(),
            info: MovieInfo::seeded(id),
            outcome: CrawlOutcome::Pending,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == CrawlOutcome::Success
    }

    pub fn failure(&self) -> Option<(FailureKind, &str)> {
        match &self.outcome {
            CrawlOutcome::Failed { kind, message } => Some((*kind, message)),
            _ => None,
        }
    }
}

/// Planned output locations for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamePlan {
    pub save_dir: PathBuf,
    /// Stem for the relocated media files.
    pub basename: String,
    pub nfo_file: PathBuf,
    pub poster_file: PathBuf,
    pub fanart_file: PathBuf,
}

/// The arbitrated record for one identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalRecord {
    pub id: Identifier,
    pub info: MovieInfo,
    /// Every distinct cover URL seen, in priority order.
    pub covers: Vec<String>,
    /// Every distinct high-res cover URL seen, in priority order.
    pub big_covers: Vec<String>,
    /// Alphabetic prefix of the catalog number.
    pub label: Option<String>,
    pub nfo_title: Option<String>,
    pub names: Option<NamePlan>,
}

impl FinalRecord {
    pub fn new(id: Identifier, info: MovieInfo) -> Self {
        Self {
            id,
            info,
            covers: Vec::new(),
            big_covers: Vec::new(),
            label: None,
            nfo_title: None,
            names: None,
        }
    }

    /// Cover URLs in the order a downloader should try them.
    ///
    /// High-res covers go first when `highres` is set.
    pub fn cover_candidates(&self, highres: bool) -> Vec<&str> {
        let big = self.big_covers.iter().filter(|_| highres);
        big.chain(self.covers.iter()).map(String::as_str).collect()
    }
}
