// file: src/utils/logging.rs
// description: Tracing subscriber initialization and colored terminal output helpers

use colored::*;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global subscriber. `RUST_LOG` wins over the verbosity flag.
pub fn init_logger(colored_output: bool, verbose: bool) {
    let level = if verbose {
        "debug,sqlx=info"
    } else {
        "info,sqlx=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_ansi(colored_output);

    // A second call (tests, embedded use) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

pub fn format_success(msg: &str) -> String {
    format!("{} {}", "✓".green().bold(), msg.green())
}

pub fn format_error(msg: &str) -> String {
    format!("{} {}", "✗".red().bold(), msg.red())
}

pub fn format_warning(msg: &str) -> String {
    format!("{} {}", "⚠".yellow().bold(), msg.yellow())
}

pub fn format_info(msg: &str) -> String {
    format!("{} {}", "ℹ".blue().bold(), msg)
}

/// Label for a ranked search hit: exact in green, possible in yellow.
pub fn format_match_label(exact: bool, possible: bool) -> String {
    if exact {
        "exact".green().bold().to_string()
    } else if possible {
        "possible".yellow().bold().to_string()
    } else {
        "other".dimmed().to_string()
    }
}
