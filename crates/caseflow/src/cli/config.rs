//! Configuration resolution for the CLI.
//!
//! Priority: `--config` path, then ~/.caseflow/caseflow.toml if it exists,
//! then built-in defaults. `--database` wins over the file.

use anyhow::{Context, Result};
use caseflow_protocol::defaults::DEFAULT_CONFIG_FILE;
use caseflow_protocol::paths::caseflow_home;
use caseflow_protocol::AppConfig;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn default_config_path() -> PathBuf {
    caseflow_home().join(DEFAULT_CONFIG_FILE)
}

pub fn resolve(explicit: Option<&Path>, database: Option<PathBuf>) -> Result<AppConfig> {
    let mut config = match explicit {
        Some(path) => load(path)?,
        None => {
            let path = default_config_path();
            if path.exists() {
                load(&path)?
            } else {
                AppConfig::default()
            }
        }
    };

    if let Some(database) = database {
        config.database.path = database;
    }
    Ok(config)
}

fn load(path: &Path) -> Result<AppConfig> {
    let config = AppConfig::load(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    info!(path = %path.display(), "Configuration loaded");
    Ok(config)
}
