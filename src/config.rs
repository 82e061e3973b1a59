use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::logging;

const APP_DIR: &str = "todostore";
const STORE_FILE: &str = "todos.json";
const LOG_DIR: &str = "logs";

pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8000";

/// Resolved runtime settings, passed explicitly to whatever needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl Config {
    /// Fills anything not given explicitly from the OS data directory.
    pub fn resolve(
        store_path: Option<PathBuf>,
        log_dir: Option<PathBuf>,
        log_level: Option<String>,
    ) -> Result<Self> {
        let store_path = match store_path {
            Some(path) => path,
            None => data_dir()?.join(STORE_FILE),
        };
        let log_dir = match log_dir {
            Some(dir) => dir,
            None => data_dir()?.join(LOG_DIR),
        };
        let log_level = match log_level {
            Some(level) => logging::normalize_level(&level)?.to_string(),
            None => logging::default_log_level().to_string(),
        };
        Ok(Self {
            store_path,
            log_dir,
            log_level,
        })
    }
}

fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().context("failed to resolve data dir")?;
    Ok(base.join(APP_DIR))
}
