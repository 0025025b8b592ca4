//! Tracing setup.
//!
//! `RUST_LOG` wins over the configured level. The dashboard never logs to the
//! terminal it draws on: without a log file its output is discarded.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Full-screen dashboard: the configured file, or nowhere.
    Dashboard,
    /// One-shot commands: stderr unless a file is configured.
    Stderr,
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(config: &LogConfig, target: LogTarget) -> Result<()> {
    let filter = filter(&config.level);

    if let Some(path) = config.file.as_deref() {
        let file = open_log(path)?;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
        return Ok(());
    }

    match target {
        LogTarget::Dashboard => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .try_init();
        }
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .try_init();
        }
    }
    Ok(())
}

fn open_log(path: &Path) -> Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))
}
