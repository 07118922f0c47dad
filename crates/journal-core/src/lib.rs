//! journal-core - Core library for Journal
//!
//! This crate contains the shared models, the remote journal API client, and
//! the page controllers (draft auto-save, entry list sync, assistant chat)
//! used by every Journal front end.

pub mod api;
pub mod auth;
pub mod autosave;
pub mod chat;
pub mod config;
pub mod entries;
pub mod error;
pub mod format;
pub mod layout;
pub mod models;
pub mod page;
pub mod util;

#[cfg(test)]
mod test_support;

pub use auth::RequestContext;
pub use error::{Error, Result};
pub use models::{ChatMessage, ChatRole, EntryId, EntryRef, JournalEntry};
