//! Diagnostics go to a file: stdout is the game screen.
//!
//! Nothing is recorded unless `SNAKE_LOG` names a file. `SNAKE_LOG_LEVEL`
//! takes an env-filter directive and defaults to `info`.

use std::{env, fs::OpenOptions, path::PathBuf, sync::Mutex};

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

const LOG_FILE_ENV: &str = "SNAKE_LOG";
const LOG_LEVEL_ENV: &str = "SNAKE_LOG_LEVEL";
const DEFAULT_DIRECTIVE: &str = "info";

pub fn init() -> Result<()> {
    let path = match env::var_os(LOG_FILE_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => return Ok(()),
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!(err))
}
