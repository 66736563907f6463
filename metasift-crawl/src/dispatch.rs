//! Crawl dispatcher: fan out one identifier to every eligible source.
//!
//! Each source runs in its own task with a private retry loop and its own
//! [`PartialRecord`]. The dispatcher waits for all of them up to one shared
//! deadline, keeps the successful records in configured priority order and
//! reports which sources were tried, which answered and which did not.

use std::sync::Arc;

use metasift_core::{CrawlOutcome, FailureKind, Identifier, PartialRecord};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};

use crate::error::FetchError;
use crate::source::{SourceAdapter, SourceRegistry, SourceSelection};

/// Retry and timeout settings for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Attempts per source. Zero is treated as one.
    pub retry: u32,
    /// Time allowed for a single adapter call.
    pub timeout: Duration,
    /// Delay before attempt `n + 1` is `backoff * n`.
    pub backoff: Duration,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            retry: 3,
            timeout: Duration::from_secs(10),
            backoff: Duration::ZERO,
        }
    }
}

impl DispatchOptions {
    pub fn budget(&self) -> u32 {
        self.retry.max(1)
    }

    /// How long the dispatcher waits for all sources together.
    pub fn join_window(&self) -> Duration {
        self.timeout.saturating_mul(self.budget())
    }
}

/// Progress events sent while a dispatch runs.
///
/// `slot` is the job's position in the fan-out, stable for the whole
/// dispatch.
#[derive(Debug, Clone)]
pub enum DispatchEvent {
    Started {
        slot: usize,
        source: String,
    },
    AttemptFailed {
        slot: usize,
        source: String,
        attempt: u32,
        kind: FailureKind,
        message: String,
    },
    Succeeded {
        slot: usize,
        source: String,
        attempts: u32,
    },
    Failed {
        slot: usize,
        source: String,
        kind: FailureKind,
        message: String,
    },
    /// No answer before the dispatch deadline.
    TimedOut { slot: usize, source: String },
    /// A content id was settled as a normal id or as a content id.
    Reclassified { id: Identifier },
}

/// A source that was attempted but produced nothing usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub source: String,
    pub kind: FailureKind,
    pub message: String,
}

/// Result of dispatching one identifier.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    /// The identifier after reclassification.
    pub id: Identifier,
    /// Successful records only, in configured priority order.
    pub records: Vec<PartialRecord>,
    pub attempted: Vec<String>,
    pub succeeded: Vec<String>,
    pub failed: Vec<SourceFailure>,
    /// Sources still running when the deadline passed. Also listed in `failed`.
    pub timed_out: Vec<String>,
}

impl DispatchReport {
    /// True when no source produced data.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, source: &str) -> Option<&PartialRecord> {
        self.records.iter().find(|r| r.source == source)
    }

    /// Source names of the kept records, highest priority first.
    pub fn priority(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.source.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    /// Sources for the identifier's own kind.
    Primary,
    /// Normal-id sources queried on behalf of a content id.
    Fallback,
}

struct Job {
    slot: usize,
    group: Group,
    source: String,
    handle: JoinHandle<PartialRecord>,
}

/// Query every eligible source for `id`.
///
/// Never fails: sources that produce nothing are listed in
/// [`DispatchReport::failed`] and an empty report means no source had data.
pub async fn dispatch(
    registry: &SourceRegistry,
    selection: &SourceSelection,
    id: &Identifier,
    options: DispatchOptions,
    events: mpsc::UnboundedSender<DispatchEvent>,
) -> DispatchReport {
    let fallback = id.fallback_normal();
    let primary_id = if fallback.is_some() {
        id.without_fallback()
    } else {
        id.clone()
    };

    let mut plan: Vec<(Group, Identifier, Arc<dyn SourceAdapter>)> = Vec::new();
    plan_group(registry, selection, Group::Primary, &primary_id, &mut plan);
    if let Some(normal) = &fallback {
        plan_group(registry, selection, Group::Fallback, normal, &mut plan);
    }

    let deadline = Instant::now() + options.join_window();
    let jobs: Vec<Job> = plan
        .into_iter()
        .enumerate()
        .map(|(slot, (group, job_id, adapter))| Job {
            slot,
            group,
            source: adapter.name().to_string(),
            handle: tokio::spawn(run_source(slot, adapter, job_id, options, events.clone())),
        })
        .collect();

    let mut finished: Vec<(Group, PartialRecord)> = Vec::with_capacity(jobs.len());
    let mut timed_out = Vec::new();
    for mut job in jobs {
        let record = match tokio::time::timeout_at(deadline, &mut job.handle).await {
            Ok(Ok(record)) => record,
            Ok(Err(join_err)) => {
                log::error!("{}: adapter task ended abnormally: {}", job.source, join_err);
                let mut record = PartialRecord::new(&job.source, id);
                record.outcome = CrawlOutcome::Failed {
                    kind: FailureKind::Unknown,
                    message: join_err.to_string(),
                };
                record
            }
            Err(_) => {
                job.handle.abort();
                log::warn!("{}: no answer before the dispatch deadline", job.source);
                let _ = events.send(DispatchEvent::TimedOut {
                    slot: job.slot,
                    source: job.source.clone(),
                });
                timed_out.push(job.source.clone());
                let mut record = PartialRecord::new(&job.source, id);
                record.outcome = CrawlOutcome::Failed {
                    kind: FailureKind::TransientNetwork,
                    message: "timed out".to_string(),
                };
                record
            }
        };
        finished.push((job.group, record));
    }

    // A content id that the normal-id sources know by title is really a
    // normal id; otherwise only the content-id sources count.
    let (final_id, kept) = match fallback {
        Some(normal) => {
            let normal_hit = finished
                .iter()
                .any(|(g, r)| *g == Group::Fallback && r.is_success() && r.info.has_title());
            let (final_id, kept) = if normal_hit {
                (normal, Group::Fallback)
            } else {
                (id.without_fallback(), Group::Primary)
            };
            log::info!("{} resolved as {} ({})", id, final_id, final_id.kind());
            let _ = events.send(DispatchEvent::Reclassified {
                id: final_id.clone(),
            });
            (final_id, kept)
        }
        None => (id.clone(), Group::Primary),
    };

    let mut report = DispatchReport {
        id: final_id,
        records: Vec::new(),
        attempted: Vec::new(),
        succeeded: Vec::new(),
        failed: Vec::new(),
        timed_out: Vec::new(),
    };
    for (group, record) in finished {
        if group != kept {
            continue;
        }
        report.attempted.push(record.source.clone());
        if timed_out.contains(&record.source) {
            report.timed_out.push(record.source.clone());
        }
        match &record.outcome {
            CrawlOutcome::Success => {
                report.succeeded.push(record.source.clone());
                report.records.push(record);
            }
            CrawlOutcome::Failed { kind, message } => report.failed.push(SourceFailure {
                source: record.source.clone(),
                kind: *kind,
                message: message.clone(),
            }),
            CrawlOutcome::Pending => report.failed.push(SourceFailure {
                source: record.source.clone(),
                kind: FailureKind::Unknown,
                message: "no result".to_string(),
            }),
        }
    }

    log::debug!(
        "{}: attempted [{}], succeeded [{}]",
        report.id,
        report.attempted.join(", "),
        report.succeeded.join(", ")
    );
    report
}

fn plan_group(
    registry: &SourceRegistry,
    selection: &SourceSelection,
    group: Group,
    id: &Identifier,
    plan: &mut Vec<(Group, Identifier, Arc<dyn SourceAdapter>)>,
) {
    let mut seen: Vec<&str> = Vec::new();
    for name in selection.for_kind(id.kind()) {
        if seen.contains(&name.as_str()) {
            continue;
        }
        seen.push(name);
        match registry.get(name) {
            Some(adapter) => plan.push((group, id.clone(), adapter)),
            None => log::warn!("Source '{}' is configured but not available, skipping", name),
        }
    }
}

/// Retry loop for one source. Runs in its own task.
async fn run_source(
    slot: usize,
    adapter: Arc<dyn SourceAdapter>,
    id: Identifier,
    options: DispatchOptions,
    events: mpsc::UnboundedSender<DispatchEvent>,
) -> PartialRecord {
    let source = adapter.name().to_string();
    let mut record = PartialRecord::new(&source, &id);
    // A self-retrying adapter gets one call bounded only by the join window.
    let (budget, attempt_timeout) = if adapter.self_retrying() {
        (1, options.join_window())
    } else {
        (options.budget(), options.timeout)
    };
    let _ = events.send(DispatchEvent::Started {
        slot,
        source: source.clone(),
    });

    let mut last: Option<FetchError> = None;
    for attempt in 1..=budget {
        if attempt > 1 && !options.backoff.is_zero() {
            tokio::time::sleep(options.backoff.saturating_mul(attempt - 1)).await;
        }

        let result = match tokio::time::timeout(attempt_timeout, adapter.fetch(&id)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::network(format!(
                "attempt timed out after {:?}",
                attempt_timeout
            ))),
        };

        match result {
            Ok(mut info) => {
                if info.dvdid.is_none() {
                    info.dvdid = record.info.dvdid.take();
                }
                if info.cid.is_none() {
                    info.cid = record.info.cid.take();
                }
                record.info = info;
                record.outcome = CrawlOutcome::Success;
                let _ = events.send(DispatchEvent::Succeeded {
                    slot,
                    source: source.clone(),
                    attempts: attempt,
                });
                return record;
            }
            Err(err) => {
                let kind = err.kind();
                if kind == FailureKind::Structural {
                    log::warn!("{}: {} (attempt {}/{})", source, err, attempt, budget);
                } else {
                    log::debug!("{}: {} (attempt {}/{})", source, err, attempt, budget);
                }
                let _ = events.send(DispatchEvent::AttemptFailed {
                    slot,
                    source: source.clone(),
                    attempt,
                    kind,
                    message: err.to_string(),
                });
                let terminal = kind.is_terminal();
                last = Some(err);
                if terminal {
                    break;
                }
            }
        }
    }

    let (kind, message) = match last {
        Some(err) => (err.kind(), err.to_string()),
        None => (FailureKind::Unknown, "no attempt made".to_string()),
    };
    if kind.is_error() {
        log::warn!("{}: {} for {}: {}", source, kind, id, message);
    } else {
        log::debug!("{}: {} for {}", source, kind, id);
    }
    let _ = events.send(DispatchEvent::Failed {
        slot,
        source,
        kind,
        message: message.clone(),
    });
    record.outcome = CrawlOutcome::Failed { kind, message };
    record
}

#[cfg(test)]
#[path = "tests/dispatch_tests.rs"]
mod tests;
