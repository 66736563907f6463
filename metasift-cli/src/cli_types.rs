//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "metasift")]
#[command(about = "Gather media metadata from several sources and plan output names", long_about = None)]
pub(crate) struct Cli {
    /// Config file (default: $METASIFT_CONFIG, then ~/.config/metasift/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub(crate) struct ScrapeArgs {
    /// Catalog numbers (e.g. ABC-123, FC2-123456, cid:118abp00123)
    pub ids: Vec<String>,

    /// TOML manifest with [[item]] entries (id, files, hard_sub, uncensored)
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// Print the results as JSON instead of a report
    #[arg(long)]
    pub json: bool,

    /// Items processed at the same time (overrides crawler.max_items_in_flight)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Resolve relative output folders against this directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Look up identifiers, merge the results and plan output paths
    Scrape(ScrapeArgs),

    /// List sources in priority order for each identifier kind
    Sources,

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a config file with every default filled in
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
