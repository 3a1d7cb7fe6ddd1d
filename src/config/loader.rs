//! Configuration loading from the file system

use std::fs;
use std::path::Path;
use tracing::{info, instrument, warn};

use super::types::Config;
use crate::error::{Result, StratumError};

/// Load configuration from settings.json.
///
/// Returns `Config::default()` if the file is missing or cannot be parsed.
#[instrument(name = "load_config", skip_all, fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Config {
    if !path.exists() {
        info!("Config file not found, using defaults");
        return Config::default();
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(error = %e, "Failed to read config file, using defaults");
            return Config::default();
        }
    };

    if content.trim().is_empty() {
        return Config::default();
    }

    match serde_json::from_str::<Config>(&content) {
        Ok(config) => {
            info!("Successfully loaded config");
            config
        }
        Err(e) => {
            warn!(error = %e, "Failed to parse config JSON, using defaults");
            Config::default()
        }
    }
}

/// Write configuration as pretty JSON, creating parent directories.
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StratumError::io(parent, e))?;
    }
    let content = serde_json::to_string_pretty(config).map_err(|e| StratumError::json(path, e))?;
    fs::write(path, content).map_err(|e| StratumError::io(path, e))?;
    Ok(())
}
