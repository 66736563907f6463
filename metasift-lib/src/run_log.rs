//! In-memory record of what happened to each item in a batch.

use std::path::PathBuf;

use metasift_core::Field;
use metasift_crawl::SourceFailure;
use serde::Serialize;

/// One entry per processed item.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LogEntry {
    Organized {
        id: String,
        save_dir: PathBuf,
        basename: String,
        /// Sources that contributed, highest priority first.
        sources: Vec<String>,
        failures: Vec<SourceFailure>,
    },
    NoData {
        id: String,
        failures: Vec<SourceFailure>,
    },
    Unresolved {
        id: String,
        missing: Vec<Field>,
        sources: Vec<String>,
    },
    NamingFailed {
        id: String,
        message: String,
    },
}

impl LogEntry {
    pub fn id(&self) -> &str {
        match self {
            LogEntry::Organized { id, .. }
            | LogEntry::NoData { id, .. }
            | LogEntry::Unresolved { id, .. }
            | LogEntry::NamingFailed { id, .. } => id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, LogEntry::Organized { .. })
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct RunLog {
    entries: Vec<LogEntry>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for entry in &self.entries {
            match entry {
                LogEntry::Organized { failures, .. } => {
                    summary.organized += 1;
                    summary.source_failures += failures.iter().filter(|f| f.kind.is_error()).count();
                }
                LogEntry::NoData { failures, .. } => {
                    summary.no_data += 1;
                    summary.source_failures += failures.iter().filter(|f| f.kind.is_error()).count();
                }
                LogEntry::Unresolved { .. } => summary.unresolved += 1,
                LogEntry::NamingFailed { .. } => summary.naming_failed += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub organized: usize,
    pub no_data: usize,
    pub unresolved: usize,
    pub naming_failed: usize,
    /// Source attempts that ended in an error (not counting "not found").
    pub source_failures: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.organized + self.no_data + self.unresolved + self.naming_failed
    }

    pub fn has_failures(&self) -> bool {
        self.organized < self.total()
    }
}
