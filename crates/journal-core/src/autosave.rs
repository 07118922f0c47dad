//! Debounced draft auto-save.
//!
//! Typing replaces the draft content and restarts a debounce timer. When the
//! timer survives a full quiet period the draft is written with
//! `is_draft = true`; an explicit submit writes it with `is_draft = false`,
//! reusing the draft's id when one exists. Writes are serialized, so a
//! submit issued while a draft save is in flight waits for it and finalizes
//! that draft. Save status is exposed through a watch channel and falls back
//! to idle on its own.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};
use tokio::time::{sleep_until, Instant};

use crate::api::EntryStore;
use crate::auth::RequestContext;
use crate::config::AutosaveConfig;
use crate::entries::RefreshTrigger;
use crate::error::{Error, Result};
use crate::models::{EntryId, EntryPayload, JournalEntry};
use crate::util::trimmed_char_count;

const EMPTY_CONTENT_MESSAGE: &str = "Content cannot be empty";
const SUBMIT_SUCCESS_MESSAGE: &str = "Entry saved successfully!";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error,
}

/// Observable editor state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftState {
    pub content: String,
    pub has_unsaved_changes: bool,
    /// Entry holding the auto-saved draft of this editing session
    pub draft_id: Option<EntryId>,
    pub status: SaveStatus,
    pub last_saved_at: Option<DateTime<Utc>>,
    /// Notice shown next to the editor; cleared together with `status`
    pub message: Option<String>,
}

/// Result of one auto-save attempt.
#[derive(Debug)]
pub enum AutosaveOutcome {
    /// Nothing to save, content under the floor, or the editor is closed
    Skipped,
    Saved(JournalEntry),
    /// Reflected in the status only; never retried
    Failed(Error),
}

struct AutosaveInner {
    store: Arc<dyn EntryStore>,
    ctx: RequestContext,
    refresh: Arc<dyn RefreshTrigger>,
    config: AutosaveConfig,
    state: watch::Sender<DraftState>,
    /// Bumped by every edit and by submit; a debounce timer only fires if
    /// the version it was armed with is still current.
    edit_version: AtomicU64,
    /// Bumped by every successful submit; drafts saved for an older session
    /// must not reattach their id.
    session: AtomicU64,
    status_epoch: AtomicU64,
    /// Held for the whole of each store write and the state update after it.
    write_lock: Mutex<()>,
    closed: AtomicBool,
}

/// Shared handle to the draft editor; clones drive the same draft.
#[derive(Clone)]
pub struct DraftAutosaveController {
    inner: Arc<AutosaveInner>,
}

impl DraftAutosaveController {
    pub fn new(
        store: Arc<dyn EntryStore>,
        ctx: RequestContext,
        config: AutosaveConfig,
        refresh: Arc<dyn RefreshTrigger>,
    ) -> Self {
        let (state, _) = watch::channel(DraftState::default());
        Self {
            inner: Arc::new(AutosaveInner {
                store,
                ctx,
                refresh,
                config,
                state,
                edit_version: AtomicU64::new(0),
                session: AtomicU64::new(0),
                status_epoch: AtomicU64::new(0),
                write_lock: Mutex::new(()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Replace the draft text and restart the debounce timer.
    pub fn on_content_change(&self, text: impl Into<String>) {
        if self.is_closed() {
            return;
        }
        let text = text.into();
        let version = self.bump_edit_version();
        self.inner.state.send_modify(|state| {
            state.content = text;
            state.has_unsaved_changes = true;
        });
        self.schedule_autosave(version, self.inner.config.debounce());
    }

    /// Replace the draft with a transcript and save it shortly after.
    pub fn apply_transcript(&self, text: impl Into<String>) {
        if self.is_closed() {
            return;
        }
        let text = text.into();
        let version = self.bump_edit_version();
        self.inner.state.send_modify(|state| {
            state.content = text;
            state.has_unsaved_changes = true;
        });
        tracing::debug!("Applied transcript to draft");
        self.schedule_autosave(version, self.inner.config.transcript_save_delay());
    }

    fn schedule_autosave(&self, version: u64, delay: Duration) {
        let deadline = Instant::now() + delay;
        let this = self.clone();
        tokio::spawn(async move {
            sleep_until(deadline).await;
            if this.is_closed() || this.inner.edit_version.load(Ordering::SeqCst) != version {
                return;
            }
            // Failures only surface through the status.
            let _ = this.auto_save_draft().await;
        });
    }

    /// Save the current content as a draft if it is long enough and dirty.
    pub async fn auto_save_draft(&self) -> AutosaveOutcome {
        if self.is_closed() {
            return AutosaveOutcome::Skipped;
        }
        let _write = self.inner.write_lock.lock().await;
        if self.is_closed() {
            return AutosaveOutcome::Skipped;
        }
        let min_chars = self.inner.config.min_chars;
        let version = self.inner.edit_version.load(Ordering::SeqCst);
        let session = self.inner.session.load(Ordering::SeqCst);

        let mut request = None;
        self.inner.state.send_if_modified(|state| {
            if !state.has_unsaved_changes || trimmed_char_count(&state.content) < min_chars {
                return false;
            }
            request = Some((state.content.clone(), state.draft_id));
            state.status = SaveStatus::Saving;
            true
        });
        let Some((content, draft_id)) = request else {
            return AutosaveOutcome::Skipped;
        };
        self.inner.status_epoch.fetch_add(1, Ordering::SeqCst);

        let payload = EntryPayload::draft(content);
        match self.write(draft_id, &payload).await {
            Ok(entry) => {
                if self.is_closed() {
                    return AutosaveOutcome::Saved(entry);
                }
                let same_session = self.inner.session.load(Ordering::SeqCst) == session;
                let unchanged = self.inner.edit_version.load(Ordering::SeqCst) == version;
                let entry_id = entry.id;
                self.inner.state.send_modify(|state| {
                    if same_session {
                        state.draft_id = Some(entry_id);
                        // Text typed while the request was in flight is still unsaved.
                        if unchanged {
                            state.has_unsaved_changes = false;
                        }
                    }
                    state.status = SaveStatus::Saved;
                    state.last_saved_at = Some(Utc::now());
                });
                tracing::info!("Auto-saved draft {}", entry_id);
                self.schedule_status_clear(self.inner.config.draft_saved_clear_ms);
                self.inner.refresh.request_refresh();
                AutosaveOutcome::Saved(entry)
            }
            Err(error) => {
                tracing::warn!("Auto-save failed: {}", error);
                if !self.is_closed() {
                    self.inner.state.send_modify(|state| {
                        state.status = SaveStatus::Error;
                    });
                    self.schedule_status_clear(self.inner.config.draft_error_clear_ms);
                }
                AutosaveOutcome::Failed(error)
            }
        }
    }

    /// Finalize the current content as a permanent entry.
    ///
    /// Updates the session's draft when there is one, otherwise creates a
    /// new entry. Empty content is rejected before any network call; other
    /// content waits for an in-flight draft save so its id can be reused.
    pub async fn submit_final(&self) -> Result<JournalEntry> {
        if self.is_closed() {
            return Err(Error::Validation("Editor is closed".to_string()));
        }
        if self.inner.state.borrow().content.trim().is_empty() {
            return Err(self.reject_empty());
        }

        let _write = self.inner.write_lock.lock().await;
        if self.is_closed() {
            return Err(Error::Validation("Editor is closed".to_string()));
        }
        let mut request = None;
        self.inner.state.send_modify(|state| {
            if state.content.trim().is_empty() {
                return;
            }
            request = Some((state.content.clone(), state.draft_id));
            state.status = SaveStatus::Saving;
            state.message = None;
        });
        let Some((content, draft_id)) = request else {
            return Err(self.reject_empty());
        };

        // Invalidates any armed debounce timer.
        let version = self.bump_edit_version();
        self.inner.status_epoch.fetch_add(1, Ordering::SeqCst);

        let payload = EntryPayload::final_entry(content);
        match self.write(draft_id, &payload).await {
            Ok(entry) => {
                self.inner.session.fetch_add(1, Ordering::SeqCst);
                if !self.is_closed() {
                    let unchanged = self.inner.edit_version.load(Ordering::SeqCst) == version;
                    self.inner.state.send_modify(|state| {
                        if unchanged {
                            state.content.clear();
                            state.has_unsaved_changes = false;
                        }
                        state.draft_id = None;
                        state.status = SaveStatus::Saved;
                        state.last_saved_at = Some(Utc::now());
                        state.message = Some(SUBMIT_SUCCESS_MESSAGE.to_string());
                    });
                    self.schedule_status_clear(self.inner.config.submit_saved_clear_ms);
                    self.inner.refresh.request_refresh();
                }
                tracing::info!("Saved entry {}", entry.id);
                Ok(entry)
            }
            Err(error) => {
                tracing::error!("Failed to save entry: {}", error);
                if !self.is_closed() {
                    let message = format!("Error saving entry: {error}");
                    self.inner.state.send_modify(|state| {
                        state.status = SaveStatus::Error;
                        state.message = Some(message);
                    });
                    self.schedule_status_clear(self.inner.config.submit_error_clear_ms);
                }
                Err(error)
            }
        }
    }

    fn reject_empty(&self) -> Error {
        self.inner.state.send_modify(|state| {
            state.message = Some(EMPTY_CONTENT_MESSAGE.to_string());
        });
        self.schedule_status_clear(self.inner.config.submit_error_clear_ms);
        Error::Validation(EMPTY_CONTENT_MESSAGE.to_string())
    }

    /// Update the draft if it exists, otherwise create; a draft that vanished
    /// server-side is replaced by a new entry.
    async fn write(
        &self,
        draft_id: Option<EntryId>,
        payload: &EntryPayload,
    ) -> Result<JournalEntry> {
        let store = &self.inner.store;
        let ctx = &self.inner.ctx;
        match draft_id {
            Some(id) => match store.update(ctx, id, payload).await {
                Err(Error::NotFound(missing)) => {
                    tracing::warn!("Draft {} no longer exists; creating a new entry", missing);
                    store.create(ctx, payload).await
                }
                result => result,
            },
            None => store.create(ctx, payload).await,
        }
    }

    fn schedule_status_clear(&self, delay_ms: u64) {
        let epoch = self.inner.status_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let deadline = Instant::now() + Duration::from_millis(delay_ms);
        let this = self.clone();
        tokio::spawn(async move {
            sleep_until(deadline).await;
            if this.is_closed() || this.inner.status_epoch.load(Ordering::SeqCst) != epoch {
                return;
            }
            this.inner.state.send_modify(|state| {
                // A save still in flight arms its own clear when it finishes.
                if state.status != SaveStatus::Saving {
                    state.status = SaveStatus::Idle;
                }
                state.message = None;
            });
        });
    }

    fn bump_edit_version(&self) -> u64 {
        self.inner.edit_version.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn state(&self) -> DraftState {
        self.inner.state.borrow().clone()
    }

    pub fn content(&self) -> String {
        self.inner.state.borrow().content.clone()
    }

    pub fn status(&self) -> SaveStatus {
        self.inner.state.borrow().status
    }

    pub fn draft_id(&self) -> Option<EntryId> {
        self.inner.state.borrow().draft_id
    }

    pub fn subscribe(&self) -> watch::Receiver<DraftState> {
        self.inner.state.subscribe()
    }

    /// Cancel pending timers and ignore completions that arrive afterwards.
    pub fn shutdown(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.bump_edit_version();
    }

    fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tokio::time::sleep;

    use super::*;
    use crate::test_support::{
        entry_at, long_text, settle, test_context, CountingRefresh, MemoryEntryStore, StoreCall,
    };

    struct Harness {
        store: MemoryEntryStore,
        refresh: Arc<CountingRefresh>,
        editor: DraftAutosaveController,
    }

    fn harness_with(store: MemoryEntryStore) -> Harness {
        let refresh = Arc::new(CountingRefresh::default());
        let editor = DraftAutosaveController::new(
            Arc::new(store.clone()),
            test_context(),
            AutosaveConfig::default(),
            refresh.clone(),
        );
        Harness {
            store,
            refresh,
            editor,
        }
    }

    fn harness() -> Harness {
        harness_with(MemoryEntryStore::default())
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_edits_save_once_after_quiet_period() {
        let h = harness();
        h.editor.on_content_change(long_text("one"));
        sleep(Duration::from_millis(1_000)).await;
        h.editor.on_content_change(long_text("two"));
        sleep(Duration::from_millis(2_999)).await;
        h.editor.on_content_change(long_text("three"));

        sleep(Duration::from_millis(2_999)).await;
        assert!(h.store.write_calls().is_empty());

        sleep(Duration::from_millis(2)).await;
        settle().await;
        assert_eq!(
            h.store.write_calls(),
            vec![StoreCall::Create { is_draft: true }]
        );
        assert_eq!(h.store.entries()[0].content, long_text("three"));

        sleep(Duration::from_secs(10)).await;
        assert_eq!(h.store.write_calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn short_content_is_never_auto_saved() {
        let h = harness();
        h.editor.on_content_change("   a short thought, well under fifty chars   ");
        sleep(Duration::from_secs(30)).await;

        assert!(h.store.calls().is_empty());
        assert_eq!(h.editor.status(), SaveStatus::Idle);
        assert!(matches!(
            h.editor.auto_save_draft().await,
            AutosaveOutcome::Skipped
        ));
        assert!(h.editor.state().has_unsaved_changes);
    }

    #[tokio::test(start_paused = true)]
    async fn floor_counts_trimmed_characters() {
        let h = harness();
        let padded = format!("{}{}{}", " ".repeat(20), "x".repeat(49), " ".repeat(20));
        h.editor.on_content_change(padded);
        assert!(matches!(
            h.editor.auto_save_draft().await,
            AutosaveOutcome::Skipped
        ));

        h.editor.on_content_change("x".repeat(50));
        assert!(matches!(
            h.editor.auto_save_draft().await,
            AutosaveOutcome::Saved(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn successful_autosave_records_draft_and_clears_status() {
        let h = harness();
        h.editor.on_content_change(long_text("draft"));
        sleep(Duration::from_millis(3_001)).await;
        settle().await;

        let state = h.editor.state();
        assert_eq!(state.status, SaveStatus::Saved);
        assert!(!state.has_unsaved_changes);
        assert!(state.draft_id.is_some());
        assert!(state.last_saved_at.is_some());
        assert_eq!(h.refresh.count(), 1);
        assert!(h.store.entries()[0].is_draft);

        sleep(Duration::from_millis(2_000)).await;
        assert_eq!(h.editor.status(), SaveStatus::Idle);
        assert_eq!(h.editor.draft_id(), state.draft_id);
    }

    #[tokio::test(start_paused = true)]
    async fn later_autosaves_update_the_same_draft() {
        let h = harness();
        h.editor.on_content_change(long_text("first"));
        sleep(Duration::from_millis(3_100)).await;
        let draft_id = h.editor.draft_id().unwrap();

        h.editor.on_content_change(long_text("second"));
        sleep(Duration::from_millis(3_100)).await;

        assert_eq!(
            h.store.write_calls(),
            vec![
                StoreCall::Create { is_draft: true },
                StoreCall::Update {
                    id: draft_id,
                    is_draft: true
                },
            ]
        );
        assert_eq!(h.store.entries().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_autosave_flags_error_without_retrying() {
        let h = harness();
        h.store
            .fail_next(Error::Service("backend down (500)".to_string()));
        h.editor.on_content_change(long_text("draft"));
        sleep(Duration::from_millis(3_001)).await;
        settle().await;

        let state = h.editor.state();
        assert_eq!(state.status, SaveStatus::Error);
        assert!(state.has_unsaved_changes);
        assert_eq!(state.draft_id, None);
        assert_eq!(h.refresh.count(), 0);

        sleep(Duration::from_millis(3_000)).await;
        assert_eq!(h.editor.status(), SaveStatus::Idle);

        sleep(Duration::from_secs(30)).await;
        assert_eq!(h.store.write_calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_with_draft_updates_instead_of_creating() {
        let h = harness();
        h.editor.on_content_change(long_text("draft"));
        sleep(Duration::from_millis(3_100)).await;
        let draft_id = h.editor.draft_id().unwrap();
        let count_before = h.store.entries().len();

        h.editor.on_content_change(long_text("final"));
        let entry = h.editor.submit_final().await.unwrap();

        assert_eq!(entry.id, draft_id);
        assert!(!entry.is_draft);
        assert_eq!(h.store.entries().len(), count_before);
        assert_eq!(
            h.store.write_calls().last(),
            Some(&StoreCall::Update {
                id: draft_id,
                is_draft: false
            })
        );

        let state = h.editor.state();
        assert_eq!(state.content, "");
        assert_eq!(state.draft_id, None);
        assert!(!state.has_unsaved_changes);
        assert_eq!(state.status, SaveStatus::Saved);
        assert_eq!(state.message.as_deref(), Some("Entry saved successfully!"));
    }

    #[tokio::test(start_paused = true)]
    async fn submit_without_draft_creates_final_entry() {
        let h = harness();
        h.editor.on_content_change("Short but final.");
        let entry = h.editor.submit_final().await.unwrap();

        assert!(!entry.is_draft);
        assert_eq!(
            h.store.write_calls(),
            vec![StoreCall::Create { is_draft: false }]
        );
        assert_eq!(h.refresh.count(), 1);

        sleep(Duration::from_millis(2_999)).await;
        assert_eq!(h.editor.status(), SaveStatus::Saved);
        sleep(Duration::from_millis(2)).await;
        let state = h.editor.state();
        assert_eq!(state.status, SaveStatus::Idle);
        assert_eq!(state.message, None);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_submit_is_rejected_without_network() {
        let h = harness();
        h.editor.on_content_change(" \n\t ");

        let error = h.editor.submit_final().await.unwrap_err();
        assert!(matches!(error, Error::Validation(_)));
        assert!(h.store.calls().is_empty());
        assert_eq!(
            h.editor.state().message.as_deref(),
            Some("Content cannot be empty")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn submit_during_inflight_draft_save_finalizes_that_draft() {
        let h = harness();
        h.store.delay_next_write(Duration::from_millis(2_000));
        h.editor.on_content_change(long_text("slow"));
        sleep(Duration::from_millis(3_001)).await;
        settle().await;
        assert_eq!(h.editor.status(), SaveStatus::Saving);

        let editor = h.editor.clone();
        let submit = tokio::spawn(async move { editor.submit_final().await });
        settle().await;
        assert_eq!(
            h.store.write_calls(),
            vec![StoreCall::Create { is_draft: true }]
        );

        sleep(Duration::from_millis(2_000)).await;
        let saved = submit.await.unwrap().unwrap();
        assert_eq!(saved.id, EntryId::new(1));
        assert_eq!(
            h.store.write_calls(),
            vec![
                StoreCall::Create { is_draft: true },
                StoreCall::Update {
                    id: EntryId::new(1),
                    is_draft: false
                },
            ]
        );
        let entries = h.store.entries();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].is_draft);
        assert_eq!(h.editor.draft_id(), None);
        assert_eq!(h.editor.content(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn draft_save_waiting_on_submit_starts_a_new_draft() {
        let h = harness();
        h.store.delay_next_write(Duration::from_millis(5_000));
        h.editor.on_content_change(long_text("first"));

        let editor = h.editor.clone();
        let submit = tokio::spawn(async move { editor.submit_final().await });
        settle().await;
        h.editor.on_content_change(long_text("second"));

        sleep(Duration::from_millis(3_100)).await;
        assert_eq!(
            h.store.write_calls(),
            vec![StoreCall::Create { is_draft: false }]
        );

        sleep(Duration::from_millis(2_000)).await;
        settle().await;
        assert_eq!(submit.await.unwrap().unwrap().id, EntryId::new(1));
        assert_eq!(
            h.store.write_calls(),
            vec![
                StoreCall::Create { is_draft: false },
                StoreCall::Create { is_draft: true },
            ]
        );
        let entries = h.store.entries();
        assert_eq!(entries[0].content, long_text("first"));
        assert!(!entries[0].is_draft);
        assert_eq!(entries[1].content, long_text("second"));
        assert!(entries[1].is_draft);
        assert_eq!(h.editor.draft_id(), Some(EntryId::new(2)));
        assert_eq!(h.editor.content(), long_text("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_submit_leaves_inflight_save_status_alone() {
        let h = harness();
        h.store.delay_next_write(Duration::from_millis(10_000));
        h.editor.on_content_change(long_text("pending"));
        sleep(Duration::from_millis(3_001)).await;
        settle().await;
        assert_eq!(h.editor.status(), SaveStatus::Saving);

        h.editor.on_content_change("");
        assert!(h.editor.submit_final().await.is_err());
        assert_eq!(
            h.editor.state().message.as_deref(),
            Some("Content cannot be empty")
        );

        sleep(Duration::from_millis(5_100)).await;
        let state = h.editor.state();
        assert_eq!(state.status, SaveStatus::Saving);
        assert_eq!(state.message, None);

        sleep(Duration::from_millis(5_000)).await;
        settle().await;
        assert_eq!(h.editor.status(), SaveStatus::Saved);
        assert_eq!(h.editor.draft_id(), Some(EntryId::new(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn submit_cancels_pending_autosave() {
        let h = harness();
        h.editor.on_content_change(long_text("typed"));
        sleep(Duration::from_millis(1_000)).await;
        h.editor.submit_final().await.unwrap();

        sleep(Duration::from_secs(10)).await;
        assert_eq!(
            h.store.write_calls(),
            vec![StoreCall::Create { is_draft: false }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_submit_keeps_content_and_shows_error() {
        let h = harness();
        h.store
            .fail_next(Error::Service("db down (500)".to_string()));
        h.editor.on_content_change("Keep me around.");

        assert!(h.editor.submit_final().await.is_err());
        let state = h.editor.state();
        assert_eq!(state.status, SaveStatus::Error);
        assert_eq!(state.content, "Keep me around.");
        assert_eq!(
            state.message.as_deref(),
            Some("Error saving entry: Service error: db down (500)")
        );
        assert_eq!(h.refresh.count(), 0);

        sleep(Duration::from_millis(4_999)).await;
        assert_eq!(h.editor.status(), SaveStatus::Error);
        sleep(Duration::from_millis(2)).await;
        assert_eq!(h.editor.status(), SaveStatus::Idle);
        assert_eq!(h.editor.state().message, None);
    }

    #[tokio::test(start_paused = true)]
    async fn vanished_draft_falls_back_to_create() {
        let h = harness_with(MemoryEntryStore::with_entries(vec![entry_at(
            1,
            1,
            "existing",
        )]));
        h.editor.on_content_change(long_text("draft"));
        sleep(Duration::from_millis(3_100)).await;
        let draft_id = h.editor.draft_id().unwrap();
        h.store.remove(draft_id);

        let entry = h.editor.submit_final().await.unwrap();
        assert_ne!(entry.id, draft_id);
        assert_eq!(
            &h.store.write_calls()[1..],
            &[
                StoreCall::Update {
                    id: draft_id,
                    is_draft: false
                },
                StoreCall::Create { is_draft: false },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn transcript_is_saved_after_short_delay() {
        let h = harness();
        h.editor.apply_transcript(long_text("dictated"));

        sleep(Duration::from_millis(999)).await;
        assert!(h.store.write_calls().is_empty());
        sleep(Duration::from_millis(2)).await;
        settle().await;
        assert_eq!(
            h.store.write_calls(),
            vec![StoreCall::Create { is_draft: true }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_timers() {
        let h = harness();
        h.editor.on_content_change(long_text("typed"));
        h.editor.shutdown();
        sleep(Duration::from_secs(10)).await;

        assert!(h.store.calls().is_empty());
        h.editor.on_content_change("ignored");
        assert_eq!(h.editor.content(), long_text("typed"));
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_observe_saving_transition() {
        let h = harness();
        let mut updates = h.editor.subscribe();
        h.editor.on_content_change(long_text("watched"));
        drop(updates.borrow_and_update());

        sleep(Duration::from_millis(3_001)).await;
        settle().await;
        assert!(updates.has_changed().unwrap());
        assert_eq!(updates.borrow_and_update().status, SaveStatus::Saved);
    }
}
