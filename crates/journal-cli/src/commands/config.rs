use std::path::Path;

use journal_core::config::{normalize_api_base_url, ClientConfig};
use journal_core::util::normalize_text_option;

use crate::cli::ConfigCommands;
use crate::config::load_config;
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, config_path: &Path) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            api_url,
            timeout_secs,
        } => {
            let config = run_config_init(config_path, api_url, timeout_secs)?;
            println!("Saved config to {}", config_path.display());
            println!("API: {}", config.api_base_url);
            Ok(())
        }
        ConfigCommands::Show => {
            let config = load_config(config_path)?;
            println!("# {}", config_path.display());
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

/// Merge explicit values into the stored config and write it back.
///
/// Environment overrides are not persisted.
pub fn run_config_init(
    config_path: &Path,
    api_url: Option<String>,
    timeout_secs: Option<u64>,
) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::load_from_path(config_path).map_err(|error| {
        CliError::Config(format!("Failed to load {}: {error}", config_path.display()))
    })?;

    if let Some(url) = normalize_text_option(api_url) {
        config.api_base_url = normalize_api_base_url(&url)?;
    }
    if let Some(timeout_secs) = timeout_secs {
        if timeout_secs == 0 {
            return Err(CliError::Config(
                "HTTP timeout must be at least one second".to_string(),
            ));
        }
        config.http_timeout_secs = timeout_secs;
    }

    config.save_to_path(config_path)?;
    tracing::debug!("Wrote config to {}", config_path.display());
    Ok(config)
}
