//! Entry list synchronization.
//!
//! [`EntryListSync`] owns the client's snapshot of the journal. Each refresh
//! replaces the snapshot wholesale and diffs it against the previous one so
//! the list can briefly highlight an entry that just appeared.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};

use crate::api::EntryStore;
use crate::auth::RequestContext;
use crate::config::EntrySyncConfig;
use crate::error::Result;
use crate::models::{EntryId, EntryRef, JournalEntry};

/// Something that can be asked to reload the entry list.
///
/// Writers hold this instead of the list itself so the refresh path is
/// explicitly injected.
pub trait RefreshTrigger: Send + Sync {
    /// Schedule a refresh; never blocks and never fails.
    fn request_refresh(&self);
}

/// Entries known to the client, newest `created_at` first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntrySnapshot {
    entries: Vec<JournalEntry>,
}

impl EntrySnapshot {
    pub fn new(mut entries: Vec<JournalEntry>) -> Self {
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self { entries }
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&JournalEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.get(id).is_some()
    }

    /// Look up an entry the way it was shown to the user.
    ///
    /// A label matches on the display number first and falls back to the
    /// raw id for entries the server never numbered.
    pub fn resolve(&self, reference: EntryRef) -> Option<&JournalEntry> {
        match reference {
            EntryRef::Label(number) => self
                .entries
                .iter()
                .find(|entry| entry.display_number() == number)
                .or_else(|| self.get(EntryId::new(number))),
            EntryRef::Id(id) => self.get(id),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry that appeared since `previous`, if the list grew.
    ///
    /// When several appear at once only the most recently created one is
    /// reported.
    pub fn newly_inserted_since(&self, previous: &Self) -> Option<EntryId> {
        if self.len() <= previous.len() {
            return None;
        }
        let known = previous
            .entries
            .iter()
            .map(|entry| entry.id)
            .collect::<HashSet<_>>();
        self.entries
            .iter()
            .filter(|entry| !known.contains(&entry.id))
            .max_by_key(|entry| entry.created_at)
            .map(|entry| entry.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub entry_id: EntryId,
    /// Increments on every request so repeated clicks on one entry re-scroll
    pub seq: u64,
}

/// Observable state of the entry list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryListState {
    pub snapshot: Arc<EntrySnapshot>,
    /// False until the first successful refresh
    pub loaded: bool,
    pub newly_inserted: Option<EntryId>,
    pub selected: Option<EntryId>,
    pub scroll_request: Option<ScrollRequest>,
}

struct SyncInner {
    store: Arc<dyn EntryStore>,
    ctx: RequestContext,
    config: EntrySyncConfig,
    state: watch::Sender<EntryListState>,
    refresh_seq: AtomicU64,
    applied_refresh: AtomicU64,
    highlight_epoch: AtomicU64,
    scroll_seq: AtomicU64,
    closed: AtomicBool,
}

/// Shared handle to the entry list; clones observe the same state.
#[derive(Clone)]
pub struct EntryListSync {
    inner: Arc<SyncInner>,
}

impl EntryListSync {
    pub fn new(store: Arc<dyn EntryStore>, ctx: RequestContext, config: EntrySyncConfig) -> Self {
        let (state, _) = watch::channel(EntryListState::default());
        Self {
            inner: Arc::new(SyncInner {
                store,
                ctx,
                config,
                state,
                refresh_seq: AtomicU64::new(0),
                applied_refresh: AtomicU64::new(0),
                highlight_epoch: AtomicU64::new(0),
                scroll_seq: AtomicU64::new(0),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Reload every entry and replace the snapshot.
    ///
    /// Returns the id marked as newly inserted, if any. On failure the
    /// previous snapshot is kept and the error is only logged here; callers
    /// may still inspect it (e.g. to react to `Unauthenticated`).
    pub async fn refresh(&self) -> Result<Option<EntryId>> {
        let seq = self.inner.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let entries = match self.inner.store.list(&self.inner.ctx).await {
            Ok(entries) => entries,
            Err(error) => {
                tracing::warn!("Failed to refresh journal entries: {}", error);
                return Err(error);
            }
        };
        if self.is_closed() {
            return Ok(None);
        }

        let snapshot = EntrySnapshot::new(entries);
        let count = snapshot.len();
        let applied_refresh = &self.inner.applied_refresh;
        let mut inserted = None;
        let applied = self.inner.state.send_if_modified(|state| {
            if seq <= applied_refresh.load(Ordering::SeqCst) {
                return false;
            }
            applied_refresh.store(seq, Ordering::SeqCst);

            // The first load never highlights anything.
            if state.loaded {
                inserted = snapshot.newly_inserted_since(&state.snapshot);
            }
            state.snapshot = Arc::new(snapshot);
            state.loaded = true;
            if inserted.is_some() {
                state.newly_inserted = inserted;
            }
            true
        });

        if !applied {
            tracing::debug!("Discarded out-of-date entry refresh #{}", seq);
            return Ok(None);
        }

        tracing::debug!("Entry list refreshed ({} entries)", count);
        if let Some(id) = inserted {
            tracing::debug!("Highlighting new entry {}", id);
            self.schedule_highlight_clear();
        }
        Ok(inserted)
    }

    fn schedule_highlight_clear(&self) {
        let epoch = self.inner.highlight_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let deadline = Instant::now() + self.inner.config.highlight();
        let this = self.clone();
        tokio::spawn(async move {
            sleep_until(deadline).await;
            if this.is_closed() || this.inner.highlight_epoch.load(Ordering::SeqCst) != epoch {
                return;
            }
            this.inner
                .state
                .send_if_modified(|state| state.newly_inserted.take().is_some());
        });
    }

    /// Select an entry for detail display. Unknown ids are ignored.
    pub fn select(&self, id: EntryId) -> bool {
        self.inner.state.send_if_modified(|state| {
            if !state.snapshot.contains(id) {
                return false;
            }
            state.selected = Some(id);
            true
        })
    }

    pub fn clear_selection(&self) {
        self.inner
            .state
            .send_if_modified(|state| state.selected.take().is_some());
    }

    /// Ask the rendering layer to bring an entry into view.
    pub fn request_scroll(&self, id: EntryId) {
        let seq = self.inner.scroll_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.state.send_modify(|state| {
            state.scroll_request = Some(ScrollRequest { entry_id: id, seq });
        });
    }

    pub fn snapshot(&self) -> Arc<EntrySnapshot> {
        Arc::clone(&self.inner.state.borrow().snapshot)
    }

    pub fn entry(&self, id: EntryId) -> Option<JournalEntry> {
        self.inner.state.borrow().snapshot.get(id).cloned()
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.inner.state.borrow().snapshot.contains(id)
    }

    pub fn newly_inserted(&self) -> Option<EntryId> {
        self.inner.state.borrow().newly_inserted
    }

    /// The selected entry, as long as it is still in the snapshot.
    pub fn selected_entry(&self) -> Option<JournalEntry> {
        let state = self.inner.state.borrow();
        state
            .selected
            .and_then(|id| state.snapshot.get(id))
            .cloned()
    }

    pub fn state(&self) -> EntryListState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<EntryListState> {
        self.inner.state.subscribe()
    }

    /// Stop timers and ignore completions that arrive afterwards.
    pub fn shutdown(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

impl RefreshTrigger for EntryListSync {
    /// Refresh after the configured delay so the write is visible server-side.
    fn request_refresh(&self) {
        if self.is_closed() {
            return;
        }
        let deadline = Instant::now() + self.inner.config.refresh_delay();
        let this = self.clone();
        tokio::spawn(async move {
            sleep_until(deadline).await;
            if this.is_closed() {
                return;
            }
            // Failures are already logged by `refresh`.
            let _ = this.refresh().await;
        });
    }
}
