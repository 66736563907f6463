//! Arbitration, naming and the batch pipeline on top of the crawl
//! dispatcher.
//!
//! Configuration is loaded once per run ([`Config`]) and passed by reference
//! to the [`Summarizer`], the [`NameGenerator`] and the [`Pipeline`].

pub mod alias;
pub mod async_util;
pub mod config;
pub mod error;
pub mod naming;
pub mod pipeline;
pub mod run_log;
pub mod summarize;
pub mod template;

pub use alias::AliasMap;
pub use config::{
    CONFIG_ENV, Config, CoverPolicy, CrawlerConfig, NetworkConfig, SummarizerConfig,
    default_config_path, resolve_config_path,
};
pub use error::{ConfigError, NamingError, PipelineError, SummarizeError, TemplateError};
pub use naming::{LengthBudget, NameGenerator, clauses, generate_names, picture_path_for};
pub use pipeline::{BatchResult, ItemOutcome, ItemReport, Pipeline, PipelineEvent};
pub use run_log::{LogEntry, RunLog, RunSummary};
pub use summarize::{Summarizer, strip_trailing_actresses, summarize};
pub use template::{NAME_KEYS, NameVars, Template};

// Re-export the lower layers so frontends can depend on this crate alone.
pub use metasift_core;
pub use metasift_crawl;
