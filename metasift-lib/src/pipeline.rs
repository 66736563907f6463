//! Per-item pipeline (dispatch, arbitration, naming) and the batch runner.
//!
//! A failure for one item never stops the batch: every item ends in an
//! [`ItemOutcome`] and a [`LogEntry`].

use std::path::PathBuf;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use metasift_core::{Field, FinalRecord, Identifier, MovieItem, NamePlan};
use metasift_crawl::{
    DispatchEvent, DispatchReport, JsonEndpointSource, SourceRegistry, dispatch,
};
use tokio::sync::mpsc;

use crate::alias::AliasMap;
use crate::async_util::run_with_events;
use crate::config::Config;
use crate::error::{NamingError, PipelineError, SummarizeError};
use crate::naming::NameGenerator;
use crate::run_log::{LogEntry, RunLog};
use crate::summarize::Summarizer;

/// Progress of a batch. `index` is the item's position in the batch.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    ItemStarted {
        index: usize,
        id: Identifier,
    },
    Dispatch {
        index: usize,
        event: DispatchEvent,
    },
    ItemFinished {
        index: usize,
        id: Identifier,
        outcome: &'static str,
    },
    Done,
}

#[derive(Debug, Clone)]
pub enum ItemOutcome {
    Organized {
        record: Box<FinalRecord>,
        plan: NamePlan,
    },
    NoData,
    Unresolved(Vec<Field>),
    NamingFailed(NamingError),
}

impl ItemOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ItemOutcome::Organized { .. } => "organized",
            ItemOutcome::NoData => "no data",
            ItemOutcome::Unresolved(_) => "unresolved",
            ItemOutcome::NamingFailed(_) => "naming failed",
        }
    }

    pub fn is_organized(&self) -> bool {
        matches!(self, ItemOutcome::Organized { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ItemReport {
    pub index: usize,
    /// The item with its identifier as settled by dispatch.
    pub item: MovieItem,
    pub dispatch: DispatchReport,
    pub outcome: ItemOutcome,
}

impl ItemReport {
    pub fn log_entry(&self) -> LogEntry {
        let id = self.item.id.to_string();
        let sources = || -> Vec<String> {
            self.dispatch
                .priority()
                .into_iter()
                .map(str::to_string)
                .collect()
        };
        match &self.outcome {
            ItemOutcome::Organized { plan, .. } => LogEntry::Organized {
                id,
                save_dir: plan.save_dir.clone(),
                basename: plan.basename.clone(),
                sources: sources(),
                failures: self.dispatch.failed.clone(),
            },
            ItemOutcome::NoData => LogEntry::NoData {
                id,
                failures: self.dispatch.failed.clone(),
            },
            ItemOutcome::Unresolved(missing) => LogEntry::Unresolved {
                id,
                missing: missing.clone(),
                sources: sources(),
            },
            ItemOutcome::NamingFailed(e) => LogEntry::NamingFailed {
                id,
                message: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchResult {
    /// In input order.
    pub reports: Vec<ItemReport>,
    pub log: RunLog,
}

/// Configuration, sources and aliases for one run.
pub struct Pipeline {
    config: Config,
    registry: SourceRegistry,
    aliases: AliasMap,
    root: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(config: Config, registry: SourceRegistry, aliases: AliasMap) -> Self {
        Self {
            config,
            registry,
            aliases,
            root: None,
        }
    }

    /// Register a JSON endpoint source for every `[sources.*]` entry and
    /// load the alias file when alias normalization is on.
    pub fn from_config(config: Config) -> Result<Self, PipelineError> {
        let timeout = Duration::from_secs(config.network.timeout_secs);
        let mut registry = SourceRegistry::new();
        for (name, endpoint) in &config.sources {
            let source = JsonEndpointSource::new(name.clone(), endpoint.clone(), timeout)
                .map_err(|e| PipelineError::Source {
                    name: name.clone(),
                    source: e,
                })?;
            registry.register(source);
        }
        log::debug!("Registered {} source(s): {}", registry.len(), registry.names().join(", "));

        let aliases = if config.crawler.normalize_actress_name {
            AliasMap::load_or_create(&config.alias_file())?
        } else {
            AliasMap::new()
        };
        Ok(Self::new(config, registry, aliases))
    }

    /// Resolve relative output folders against `root` instead of the
    /// current directory.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    fn names(&self) -> NameGenerator<'_> {
        let generator = NameGenerator::new(&self.config);
        match &self.root {
            Some(root) => generator.with_root(root.clone()),
            None => generator,
        }
    }

    /// Dispatch, arbitrate and name one item.
    pub async fn process_item(
        &self,
        index: usize,
        mut item: MovieItem,
        events: &mpsc::UnboundedSender<PipelineEvent>,
    ) -> ItemReport {
        let _ = events.send(PipelineEvent::ItemStarted {
            index,
            id: item.id.clone(),
        });

        let (tx, rx) = mpsc::unbounded_channel();
        let task = dispatch(
            &self.registry,
            &self.config.crawler.selection,
            &item.id,
            self.config.dispatch_options(),
            tx,
        );
        let report = run_with_events(task, rx, |event| {
            let _ = events.send(PipelineEvent::Dispatch { index, event });
        })
        .await;

        if report.id != item.id {
            item.id = report.id.clone();
        }

        let summarizer = Summarizer::new(&self.config, &self.aliases);
        let outcome = match summarizer.summarize(&item, &report.records) {
            Err(SummarizeError::NoData) => ItemOutcome::NoData,
            Err(SummarizeError::MissingFields(missing)) => ItemOutcome::Unresolved(missing),
            Ok(mut record) => match self.names().generate(&item, &mut record) {
                Ok(plan) => {
                    log::info!("{}: -> {}", item.id, plan.save_dir.display());
                    ItemOutcome::Organized {
                        record: Box::new(record),
                        plan,
                    }
                }
                Err(e) => {
                    log::error!("{}: {}", item.id, e);
                    ItemOutcome::NamingFailed(e)
                }
            },
        };

        let _ = events.send(PipelineEvent::ItemFinished {
            index,
            id: item.id.clone(),
            outcome: outcome.label(),
        });
        ItemReport {
            index,
            item,
            dispatch: report,
            outcome,
        }
    }

    /// Process `items`, at most `max_items_in_flight` at a time.
    pub async fn run_batch(
        &self,
        items: Vec<MovieItem>,
        events: mpsc::UnboundedSender<PipelineEvent>,
    ) -> BatchResult {
        let in_flight = self.config.crawler.max_items_in_flight.max(1);
        log::debug!("Processing {} item(s), {} at a time", items.len(), in_flight);

        let mut reports: Vec<ItemReport> = stream::iter(items.into_iter().enumerate())
            .map(|(index, item)| self.process_item(index, item, &events))
            .buffer_unordered(in_flight)
            .collect()
            .await;
        reports.sort_by_key(|r| r.index);

        let mut log = RunLog::new();
        for report in &reports {
            log.add(report.log_entry());
        }
        let _ = events.send(PipelineEvent::Done);

        BatchResult { reports, log }
    }
}

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod tests;
