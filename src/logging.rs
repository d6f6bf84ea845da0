//! Tracing setup for the two front ends.
//!
//! The CLI logs to stderr. The TUI owns the terminal, so it logs to a file in
//! the data directory instead. Both honor `EISEN_LOG` (an `EnvFilter` spec).

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "EISEN_LOG";
pub const LOG_FILE: &str = "eisen.log";

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Log to stderr, warnings and above unless `EISEN_LOG` says otherwise
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter("warn"))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Append logs to `<data_dir>/eisen.log`
pub fn init_file(data_dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(data_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter("info"))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}
