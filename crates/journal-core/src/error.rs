//! Error types for journal-core

use thiserror::Error;

use crate::models::EntryId;

/// Result type alias using journal-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in journal-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected before any network call
    #[error("{0}")]
    Validation(String),

    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with an error payload
    #[error("Service error: {0}")]
    Service(String),

    /// Entry not found
    #[error("Entry not found: {0}")]
    NotFound(EntryId),

    /// Missing, expired, or rejected credentials
    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    /// The OS keychain could not be read or written
    #[error("Secure storage error: {0}")]
    SecureStorage(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the caller should hand control back to the auth collaborator.
    pub const fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated(_))
    }
}
