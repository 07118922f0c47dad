//! The journal page: one entry list shared by the editor and the assistant.

use std::sync::Arc;

use crate::api::{ChatService, EntryStore};
use crate::auth::RequestContext;
use crate::autosave::DraftAutosaveController;
use crate::chat::ChatSession;
use crate::config::ClientConfig;
use crate::entries::{EntryListSync, RefreshTrigger};
use crate::error::Result;
use crate::layout::PaneLayout;
use crate::models::EntryId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActiveTab {
    #[default]
    Journal,
    Chat,
}

pub struct JournalPage {
    entries: EntryListSync,
    editor: DraftAutosaveController,
    chat: ChatSession,
    layout: PaneLayout,
    active_tab: ActiveTab,
}

impl JournalPage {
    pub fn new(
        store: Arc<dyn EntryStore>,
        assistant: Arc<dyn ChatService>,
        ctx: RequestContext,
        config: &ClientConfig,
    ) -> Self {
        let entries = EntryListSync::new(store.clone(), ctx.clone(), config.entries);
        let refresh: Arc<dyn RefreshTrigger> = Arc::new(entries.clone());
        let editor = DraftAutosaveController::new(store, ctx.clone(), config.autosave, refresh);
        let chat = ChatSession::new(assistant, ctx, entries.clone(), config.chat);
        Self {
            entries,
            editor,
            chat,
            layout: PaneLayout::new(),
            active_tab: ActiveTab::default(),
        }
    }

    /// Load the entry list for the first time.
    pub async fn open(&self) -> Result<()> {
        self.entries.refresh().await.map(|_| ())
    }

    pub const fn entries(&self) -> &EntryListSync {
        &self.entries
    }

    pub const fn editor(&self) -> &DraftAutosaveController {
        &self.editor
    }

    pub const fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub const fn layout(&self) -> &PaneLayout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut PaneLayout {
        &mut self.layout
    }

    pub const fn active_tab(&self) -> ActiveTab {
        self.active_tab
    }

    pub fn set_active_tab(&mut self, tab: ActiveTab) {
        self.active_tab = tab;
    }

    /// Follow a citation from the assistant, opening the sidebar so the entry
    /// is visible.
    pub fn open_source(&mut self, id: EntryId) -> bool {
        let found = self.chat.on_source_click(id);
        if found {
            self.layout.set_collapsed(false);
        }
        found
    }

    pub fn shutdown(&self) {
        self.editor.shutdown();
        self.chat.shutdown();
        self.entries.shutdown();
        tracing::debug!("Journal page closed");
    }
}
