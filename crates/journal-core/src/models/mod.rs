//! Data models for Journal

mod chat;
mod entry;

pub use chat::{ChatMessage, ChatReply, ChatRequest, ChatRole, SourceRef};
pub use entry::{EntryId, EntryPayload, EntryRef, JournalEntry};
