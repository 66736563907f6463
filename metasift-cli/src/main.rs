//! metasift CLI
//!
//! Looks up catalog numbers across the configured sources, merges what they
//! return and prints the planned output paths.

mod cli_types;
mod commands;
mod error;
mod spinner;

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use env_logger::{Builder, Target};
use log::LevelFilter;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use cli_types::{Cli, Commands, ConfigAction};

fn init_logger(verbose: bool, quiet: bool, to_stderr: bool) {
    if std::env::var_os("RUST_LOG").is_some() {
        env_logger::init();
        return;
    }

    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    let mut builder = Builder::new();
    builder
        .target(if to_stderr { Target::Stderr } else { Target::Stdout })
        .filter_level(LevelFilter::Warn)
        .filter_module("metasift", level);
    if verbose {
        builder.format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} [{}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        });
    } else {
        builder.format(|buf, record| writeln!(buf, "{}", record.args()));
    }
    builder.init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = matches!(&cli.command, Commands::Scrape(args) if args.json);
    init_logger(cli.verbose, cli.quiet, json);

    let config_path = metasift_lib::resolve_config_path(cli.config);
    let hide_progress = cli.quiet || json;

    let result = match cli.command {
        Commands::Scrape(args) => commands::scrape::run_scrape(&config_path, args, hide_progress),
        Commands::Sources => commands::sources::run_sources(&config_path),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(&config_path),
            ConfigAction::Path => commands::config::run_config_path(&config_path),
            ConfigAction::Init { force } => commands::config::run_config_init(&config_path, force),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{} {}", "\u{2718}".if_supports_color(Stderr, |t| t.red()), e);
            ExitCode::FAILURE
        }
    }
}
