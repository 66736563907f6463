use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use metasift_lib::Config;

use crate::error::CliError;

/// Print the effective configuration as TOML.
pub(crate) fn run_config_show(path: &Path) -> Result<(), CliError> {
    let status = if path.exists() {
        "(exists)".if_supports_color(Stdout, |t| t.green()).to_string()
    } else {
        "(not found, using defaults)"
            .if_supports_color(Stdout, |t| t.dimmed())
            .to_string()
    };
    log::info!(
        "{} {} {}",
        "Config file:".if_supports_color(Stdout, |t| t.bold()),
        path.display().if_supports_color(Stdout, |t| t.cyan()),
        status,
    );
    log::info!("");

    let config = Config::load(path)?;
    println!("{}", config.to_toml_string()?);
    Ok(())
}

/// Print the config file path.
pub(crate) fn run_config_path(path: &Path) -> Result<(), CliError> {
    println!("{}", path.display());
    Ok(())
}

/// Write the defaults to `path`.
pub(crate) fn run_config_init(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        return Err(CliError::other(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    Config::default().save(path)?;
    log::info!(
        "{} Wrote default config to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        path.display(),
    );
    Ok(())
}
