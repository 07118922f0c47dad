//! Client configuration.
//!
//! `ClientConfig` carries the API endpoint plus every timing knob used by the
//! page controllers. All fields default, so an empty JSON object is a valid
//! configuration file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

/// Environment variable overriding the configured API base URL.
pub const API_URL_ENV: &str = "JOURNAL_API_URL";

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub http_timeout_secs: u64,
    pub autosave: AutosaveConfig,
    pub entries: EntrySyncConfig,
    pub chat: ChatConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            http_timeout_secs: 30,
            autosave: AutosaveConfig::default(),
            entries: EntrySyncConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

/// Draft auto-save timings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AutosaveConfig {
    /// Inactivity window before a draft is saved
    pub debounce_ms: u64,
    /// Drafts shorter than this (after trimming) are never auto-saved
    pub min_chars: usize,
    pub draft_saved_clear_ms: u64,
    pub draft_error_clear_ms: u64,
    pub submit_saved_clear_ms: u64,
    pub submit_error_clear_ms: u64,
    /// Delay between receiving a transcript and auto-saving it
    pub transcript_save_delay_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 3_000,
            min_chars: 50,
            draft_saved_clear_ms: 2_000,
            draft_error_clear_ms: 3_000,
            submit_saved_clear_ms: 3_000,
            submit_error_clear_ms: 5_000,
            transcript_save_delay_ms: 1_000,
        }
    }
}

impl AutosaveConfig {
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub const fn transcript_save_delay(&self) -> Duration {
        Duration::from_millis(self.transcript_save_delay_ms)
    }
}

/// Entry list refresh and highlight timings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct EntrySyncConfig {
    /// How long a newly inserted entry stays highlighted
    pub highlight_ms: u64,
    /// Delay between a successful write and the list refresh it triggers
    pub refresh_delay_ms: u64,
}

impl Default for EntrySyncConfig {
    fn default() -> Self {
        Self {
            highlight_ms: 1_000,
            refresh_delay_ms: 300,
        }
    }
}

impl EntrySyncConfig {
    pub const fn highlight(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }

    pub const fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ChatConfig {
    /// Candidate entries the assistant may cite per answer
    pub source_limit: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self { source_limit: 3 }
    }
}

impl ClientConfig {
    /// Load a config file, returning defaults when it does not exist.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let mut config = serde_json::from_str::<Self>(&raw)?;
        config.api_base_url = normalize_api_base_url(&config.api_base_url)?;
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Apply `JOURNAL_API_URL` when it is set to a non-empty value.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_api_url_override(std::env::var(API_URL_ENV).ok())
    }

    fn apply_api_url_override(&mut self, value: Option<String>) -> Result<()> {
        if let Some(url) = normalize_text_option(value) {
            self.api_base_url = normalize_api_base_url(&url)?;
        }
        Ok(())
    }

    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Trim and validate an API base URL, dropping trailing slashes and `/api`.
pub fn normalize_api_base_url(raw: &str) -> Result<String> {
    let base = raw.trim().trim_end_matches('/');
    if base.is_empty() {
        return Err(Error::InvalidConfiguration(
            "API base URL must not be empty".to_string(),
        ));
    }
    if !is_http_url(base) {
        return Err(Error::InvalidConfiguration(
            "API base URL must include http:// or https://".to_string(),
        ));
    }
    Ok(base.strip_suffix("/api").unwrap_or(base).to_string())
}
