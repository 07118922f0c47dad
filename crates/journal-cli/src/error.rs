use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] journal_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No entry content provided")]
    EmptyContent,
    #[error("Entry ID cannot be empty")]
    EmptyEntryId,
    #[error("Invalid entry id: {0}")]
    InvalidEntryId(String),
    #[error("No entry labelled {0}")]
    UnknownEntry(String),
    #[error("Question cannot be empty")]
    EmptyQuestion,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Not signed in. Run `journal auth login` first.")]
    NotSignedIn,
}
