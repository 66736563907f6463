use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use serde::{Deserialize, Serialize};

use metasift_core::{FinalRecord, Identifier, MovieItem};
use metasift_crawl::DispatchEvent;
use metasift_lib::async_util::run_with_events;
use metasift_lib::{BatchResult, Config, ItemOutcome, LogEntry, Pipeline, PipelineEvent, RunSummary};

use crate::cli_types::ScrapeArgs;
use crate::error::CliError;
use crate::spinner::SpinnerPool;

/// `[[item]]` entries of a scrape manifest.
#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(default)]
    item: Vec<MovieItem>,
}

fn load_manifest(path: &Path) -> Result<Vec<MovieItem>, CliError> {
    let contents = std::fs::read_to_string(path)?;
    let manifest: Manifest = toml::from_str(&contents).map_err(|e| CliError::Manifest {
        path: path.to_path_buf(),
        source: e,
    })?;

    // Relative media paths are relative to the manifest.
    let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let items = manifest
        .item
        .into_iter()
        .map(|mut item| {
            item.files = item
                .files
                .into_iter()
                .map(|f| if f.is_relative() { base.join(f) } else { f })
                .collect::<Vec<PathBuf>>();
            item
        })
        .collect();
    Ok(items)
}

fn collect_items(args: &ScrapeArgs) -> Result<Vec<MovieItem>, CliError> {
    let mut items = match &args.manifest {
        Some(path) => load_manifest(path)?,
        None => Vec::new(),
    };
    for raw in &args.ids {
        let id: Identifier = raw.parse()?;
        items.push(MovieItem::new(id));
    }
    Ok(items)
}

pub(crate) fn run_scrape(
    config_path: &Path,
    args: ScrapeArgs,
    hide_progress: bool,
) -> Result<(), CliError> {
    let mut config = Config::load(config_path)?;
    if let Some(jobs) = args.jobs {
        config.crawler.max_items_in_flight = jobs.max(1);
    }

    let items = collect_items(&args)?;
    if items.is_empty() {
        return Err(CliError::other(
            "Nothing to scrape: pass identifiers or --manifest",
        ));
    }

    let mut pipeline = Pipeline::from_config(config)?;
    if let Some(root) = args.output.clone() {
        pipeline = pipeline.with_root(root);
    }
    if pipeline.registry().is_empty() {
        log::warn!(
            "{} No sources configured; add [sources.<name>] entries to {}",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            config_path.display(),
        );
    }

    let total = items.len();
    let in_flight = pipeline.config().crawler.max_items_in_flight;
    let rt = tokio::runtime::Runtime::new().map_err(|e| CliError::runtime(e.to_string()))?;

    let result = rt.block_on(async {
        let mut pool = SpinnerPool::new(in_flight, hide_progress);
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let result = run_with_events(pipeline.run_batch(items, tx), rx, |e| {
            show_event(&mut pool, total, e)
        })
        .await;
        pool.clear_all();
        result
    });

    let summary = result.log.summary();
    if args.json {
        print_json(&result, summary)?;
    } else {
        print_report(&result, summary);
    }

    if summary.has_failures() {
        Err(CliError::Incomplete {
            failed: summary.total() - summary.organized,
            total: summary.total(),
        })
    } else {
        Ok(())
    }
}

fn show_event(pool: &mut SpinnerPool, total: usize, event: PipelineEvent) {
    match event {
        PipelineEvent::ItemStarted { index, id } => {
            pool.claim(index, format!("[{}/{}] {}", index + 1, total, id));
        }
        PipelineEvent::Dispatch { index, event } => {
            let msg = match event {
                DispatchEvent::Started { source, .. } => format!("querying {}", source),
                DispatchEvent::AttemptFailed {
                    source,
                    attempt,
                    kind,
                    ..
                } => format!("{} attempt {} failed ({})", source, attempt, kind),
                DispatchEvent::Succeeded { source, .. } => format!("{} answered", source),
                DispatchEvent::Failed { source, kind, .. } => format!("{}: {}", source, kind),
                DispatchEvent::TimedOut { source, .. } => format!("{} timed out", source),
                DispatchEvent::Reclassified { id } => format!("settled as {}", id),
            };
            pool.update(index, format!("[{}/{}] {}", index + 1, total, msg));
        }
        PipelineEvent::ItemFinished { index, .. } => pool.release(index),
        PipelineEvent::Done => {}
    }
}

fn print_report(result: &BatchResult, summary: RunSummary) {
    for report in &result.reports {
        let id = &report.item.id;
        match &report.outcome {
            ItemOutcome::Organized { record, plan } => {
                log::info!(
                    "{} {} {}",
                    "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                    id.if_supports_color(Stdout, |t| t.bold()),
                    record.info.title.as_deref().unwrap_or_default(),
                );
                log::info!(
                    "    {} {}",
                    "dir:".if_supports_color(Stdout, |t| t.cyan()),
                    plan.save_dir.display(),
                );
                log::info!(
                    "    {} {}",
                    "name:".if_supports_color(Stdout, |t| t.cyan()),
                    plan.basename,
                );
                log::info!(
                    "    {} {}",
                    "sources:".if_supports_color(Stdout, |t| t.cyan()),
                    report.dispatch.priority().join(", "),
                );
            }
            ItemOutcome::NoData => {
                log::warn!(
                    "{} {}: no source produced data",
                    "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                    id,
                );
            }
            ItemOutcome::Unresolved(missing) => {
                let names: Vec<&str> = missing.iter().map(|f| f.name()).collect();
                log::warn!(
                    "{} {}: missing {}",
                    "?".if_supports_color(Stdout, |t| t.yellow()),
                    id,
                    names.join(", "),
                );
            }
            ItemOutcome::NamingFailed(e) => {
                log::warn!(
                    "{} {}: {}",
                    "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                    id,
                    e,
                );
            }
        }
        if !report.outcome.is_organized() {
            for failure in &report.dispatch.failed {
                log::warn!(
                    "    {} {}: {}",
                    failure.source,
                    failure.kind,
                    failure.message.if_supports_color(Stdout, |t| t.dimmed()),
                );
            }
        }
    }

    log::info!("");
    log::info!(
        "{} organized, {} without data, {} unresolved, {} naming failures",
        summary.organized,
        summary.no_data,
        summary.unresolved,
        summary.naming_failed,
    );
}

#[derive(Serialize)]
struct JsonItem<'a> {
    #[serde(flatten)]
    entry: &'a LogEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<&'a FinalRecord>,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    items: Vec<JsonItem<'a>>,
    summary: RunSummary,
}

fn print_json(result: &BatchResult, summary: RunSummary) -> Result<(), CliError> {
    let items = result
        .reports
        .iter()
        .zip(result.log.entries())
        .map(|(report, entry)| JsonItem {
            entry,
            record: match &report.outcome {
                ItemOutcome::Organized { record, .. } => Some(record.as_ref()),
                _ => None,
            },
        })
        .collect();
    let out = serde_json::to_string_pretty(&JsonOutput { items, summary })?;
    println!("{}", out);
    Ok(())
}
