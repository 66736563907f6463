use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use metasift_core::IdKind;
use metasift_lib::Config;

use crate::error::CliError;

/// List sources in priority order for each identifier kind, marking the
/// ones with an endpoint configured.
pub(crate) fn run_sources(path: &Path) -> Result<(), CliError> {
    let config = Config::load(path)?;
    let selection = &config.crawler.selection;

    for &kind in IdKind::all() {
        log::info!(
            "{} {}",
            kind.display_name().if_supports_color(Stdout, |t| t.bold()),
            format!("({})", kind.short_name()).if_supports_color(Stdout, |t| t.dimmed()),
        );
        let names = selection.for_kind(kind);
        if names.is_empty() {
            log::info!("  {}", "no sources".if_supports_color(Stdout, |t| t.dimmed()));
        }
        for (rank, name) in names.iter().enumerate() {
            match config.sources.get(name) {
                Some(source) => log::info!(
                    "  {}. {} {} {}",
                    rank + 1,
                    "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                    name,
                    source.endpoint.if_supports_color(Stdout, |t| t.dimmed()),
                ),
                None => log::info!(
                    "  {}. {} {} {}",
                    rank + 1,
                    "-".if_supports_color(Stdout, |t| t.dimmed()),
                    name,
                    "(no endpoint configured)".if_supports_color(Stdout, |t| t.yellow()),
                ),
            }
        }
    }

    let selected = selection.all_names();
    let unused: Vec<&str> = config
        .sources
        .keys()
        .map(String::as_str)
        .filter(|name| !selected.contains(name))
        .collect();
    if !unused.is_empty() {
        log::warn!(
            "{} Configured but not selected for any kind: {}",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            unused.join(", "),
        );
    }
    Ok(())
}
