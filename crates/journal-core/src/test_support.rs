//! In-memory service doubles shared by controller tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::api::{ChatService, EntryStore};
use crate::auth::{AuthUser, RequestContext};
use crate::error::{Error, Result};
use crate::models::{ChatReply, ChatRequest, EntryId, EntryPayload, JournalEntry};

pub fn test_context() -> RequestContext {
    RequestContext::new(
        "test-token",
        AuthUser {
            id: "1".to_string(),
            username: "tester".to_string(),
        },
    )
}

pub fn entry_at(id: i64, minute: u32, content: &str) -> JournalEntry {
    JournalEntry {
        id: EntryId::new(id),
        display_id: None,
        content: content.to_string(),
        created_at: timestamp(minute),
        updated_at: None,
        is_draft: false,
    }
}

pub fn timestamp(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 18, 9, minute, 0).unwrap()
}

/// Let spawned tasks that are ready run to completion.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// Content that clears the auto-save floor.
pub fn long_text(seed: &str) -> String {
    format!("{seed}: {}", "today I walked along the river and thought about it ".repeat(2))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreCall {
    List,
    Get(EntryId),
    Create { is_draft: bool },
    Update { id: EntryId, is_draft: bool },
    Delete(EntryId),
}

#[derive(Default)]
struct MemoryState {
    entries: Vec<JournalEntry>,
    next_id: i64,
    next_minute: u32,
    calls: Vec<StoreCall>,
    failures: VecDeque<Error>,
    write_delays: VecDeque<Duration>,
}

/// `EntryStore` backed by a vector, with scripted one-shot failures and
/// write latency.
#[derive(Clone, Default)]
pub struct MemoryEntryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryEntryStore {
    pub fn with_entries(entries: Vec<JournalEntry>) -> Self {
        let store = Self::default();
        {
            let mut state = store.state.lock().unwrap();
            state.next_id = entries.iter().map(|entry| entry.id.get()).max().unwrap_or(0);
            state.next_minute = 30;
            state.entries = entries;
        }
        store
    }

    pub fn fail_next(&self, error: Error) {
        self.state.lock().unwrap().failures.push_back(error);
    }

    /// Hold the next create or update for `delay` before applying it.
    pub fn delay_next_write(&self, delay: Duration) {
        self.state.lock().unwrap().write_delays.push_back(delay);
    }

    async fn write_latency(&self) {
        let delay = self.state.lock().unwrap().write_delays.pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn insert(&self, entry: JournalEntry) {
        self.state.lock().unwrap().entries.push(entry);
    }

    pub fn remove(&self, id: EntryId) {
        self.state.lock().unwrap().entries.retain(|entry| entry.id != id);
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.state.lock().unwrap().entries.clone()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn write_calls(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, StoreCall::Create { .. } | StoreCall::Update { .. }))
            .collect()
    }

    fn record(&self, call: StoreCall) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state.failures.pop_front().map_or(Ok(()), Err)
    }
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn list(&self, _ctx: &RequestContext) -> Result<Vec<JournalEntry>> {
        self.record(StoreCall::List)?;
        let mut entries = self.entries();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn get(&self, _ctx: &RequestContext, id: EntryId) -> Result<JournalEntry> {
        self.record(StoreCall::Get(id))?;
        self.entries()
            .into_iter()
            .find(|entry| entry.id == id)
            .ok_or(Error::NotFound(id))
    }

    async fn create(&self, _ctx: &RequestContext, payload: &EntryPayload) -> Result<JournalEntry> {
        self.record(StoreCall::Create {
            is_draft: payload.is_draft,
        })?;
        self.write_latency().await;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        state.next_minute += 1;
        let entry = JournalEntry {
            id: EntryId::new(state.next_id),
            display_id: None,
            content: payload.content.clone(),
            created_at: timestamp(state.next_minute % 60),
            updated_at: None,
            is_draft: payload.is_draft,
        };
        state.entries.push(entry.clone());
        Ok(entry)
    }

    async fn update(
        &self,
        _ctx: &RequestContext,
        id: EntryId,
        payload: &EntryPayload,
    ) -> Result<JournalEntry> {
        self.record(StoreCall::Update {
            id,
            is_draft: payload.is_draft,
        })?;
        self.write_latency().await;
        let mut state = self.state.lock().unwrap();
        let entry = state
            .entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(Error::NotFound(id))?;
        entry.content.clone_from(&payload.content);
        entry.is_draft = payload.is_draft;
        Ok(entry.clone())
    }

    async fn delete(&self, _ctx: &RequestContext, id: EntryId) -> Result<()> {
        self.record(StoreCall::Delete(id))?;
        let mut state = self.state.lock().unwrap();
        let before = state.entries.len();
        state.entries.retain(|entry| entry.id != id);
        if state.entries.len() == before {
            return Err(Error::NotFound(id));
        }
        Ok(())
    }
}

/// `ChatService` that replays queued replies and counts requests.
#[derive(Clone, Default)]
pub struct ScriptedChatService {
    replies: Arc<Mutex<VecDeque<Result<ChatReply>>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
    delay: Option<Duration>,
}

impl ScriptedChatService {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn push_reply(&self, reply: Result<ChatReply>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatService for ScriptedChatService {
    async fn ask(&self, _ctx: &RequestContext, request: &ChatRequest) -> Result<ChatReply> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Service("no scripted reply".to_string())))
    }
}

/// Counts refresh requests instead of refreshing anything.
#[derive(Default)]
pub struct CountingRefresh {
    count: AtomicUsize,
}

impl CountingRefresh {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl crate::entries::RefreshTrigger for CountingRefresh {
    fn request_refresh(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}
