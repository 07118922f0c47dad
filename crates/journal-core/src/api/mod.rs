//! Remote services consumed by the page controllers.
//!
//! Controllers only see the [`EntryStore`] and [`ChatService`] traits; the
//! REST transport lives in [`http`].

mod http;

use async_trait::async_trait;

pub use http::HttpJournalClient;

use crate::auth::RequestContext;
use crate::error::Result;
use crate::models::{ChatReply, ChatRequest, EntryId, EntryPayload, JournalEntry};

/// Persistence for the signed-in user's journal entries
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// All entries, newest `created_at` first
    async fn list(&self, ctx: &RequestContext) -> Result<Vec<JournalEntry>>;

    /// A single entry; `Error::NotFound` if the id is unknown
    async fn get(&self, ctx: &RequestContext, id: EntryId) -> Result<JournalEntry>;

    async fn create(&self, ctx: &RequestContext, payload: &EntryPayload) -> Result<JournalEntry>;

    /// `Error::NotFound` if the id is unknown
    async fn update(
        &self,
        ctx: &RequestContext,
        id: EntryId,
        payload: &EntryPayload,
    ) -> Result<JournalEntry>;

    async fn delete(&self, ctx: &RequestContext, id: EntryId) -> Result<()>;
}

/// Assistant answering questions grounded in the user's entries
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn ask(&self, ctx: &RequestContext, request: &ChatRequest) -> Result<ChatReply>;
}
