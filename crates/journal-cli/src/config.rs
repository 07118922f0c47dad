//! Config file location for the CLI.

use std::env;
use std::path::{Path, PathBuf};

use journal_core::config::ClientConfig;

use crate::error::CliError;

const CONFIG_FILE_NAME: &str = "cli-config.json";

/// Environment variable pointing at an alternate config file.
pub const CONFIG_PATH_ENV: &str = "JOURNAL_CONFIG";

pub fn default_config_path() -> Result<PathBuf, CliError> {
    dirs::config_dir()
        .map(|dir| dir.join("journal").join(CONFIG_FILE_NAME))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI config directory".to_string()))
}

pub fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Some(path) = env::var_os(CONFIG_PATH_ENV).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    default_config_path()
}

/// Config file contents with environment overrides applied.
pub fn load_config(path: &Path) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::load_from_path(path).map_err(|error| {
        CliError::Config(format!("Failed to load {}: {error}", path.display()))
    })?;
    config.apply_env_overrides()?;
    Ok(config)
}
