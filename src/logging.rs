//! Tracing setup.
//!
//! The terminal UI owns stdout and stderr, so log lines go to a file.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

pub fn default_log_file() -> PathBuf {
    std::env::temp_dir().join("wiki-images.log")
}

/// Filter directive for a `-v` count: none keeps the configured level.
pub fn level_for_verbosity(verbose: u8, configured: &str) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global subscriber, appending to `log_file`.
///
/// `RUST_LOG` takes precedence over `level`. Calling this twice keeps the
/// first subscriber.
pub fn init_logging(level: &str, log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(filter)
        .try_init();

    Ok(())
}
