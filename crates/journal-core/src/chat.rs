//! Assistant conversation.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::api::ChatService;
use crate::auth::RequestContext;
use crate::config::ChatConfig;
use crate::entries::EntryListSync;
use crate::error::Error;
use crate::models::{ChatMessage, ChatRequest, EntryId};

/// Shown in place of an answer when the assistant call fails.
pub const CHAT_ERROR_MESSAGE: &str = "Sorry, there was an error processing your request.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    /// In completion order
    pub messages: Vec<ChatMessage>,
    pub pending_input: String,
    /// True while at least one question is awaiting an answer
    pub is_waiting: bool,
}

#[derive(Debug)]
pub enum AskOutcome {
    /// Blank question, or the session is closed; nothing was sent
    Rejected,
    Answered(ChatMessage),
    /// The error message was appended; the cause is returned so callers can
    /// react to `Unauthenticated`.
    Failed(Error),
}

struct ChatInner {
    service: Arc<dyn ChatService>,
    ctx: RequestContext,
    entries: EntryListSync,
    config: ChatConfig,
    state: watch::Sender<ChatState>,
    in_flight: AtomicUsize,
    closed: AtomicBool,
}

#[derive(Clone)]
pub struct ChatSession {
    inner: Arc<ChatInner>,
}

impl ChatSession {
    /// `entries` resolves source citations; it is never refreshed from here.
    pub fn new(
        service: Arc<dyn ChatService>,
        ctx: RequestContext,
        entries: EntryListSync,
        config: ChatConfig,
    ) -> Self {
        let (state, _) = watch::channel(ChatState::default());
        Self {
            inner: Arc::new(ChatInner {
                service,
                ctx,
                entries,
                config,
                state,
                in_flight: AtomicUsize::new(0),
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn set_input(&self, text: impl Into<String>) {
        let text = text.into();
        self.inner.state.send_modify(|state| state.pending_input = text);
    }

    /// Ask the pending input, clearing it unless it was blank.
    pub async fn submit_input(&self) -> AskOutcome {
        let mut question = None;
        self.inner.state.send_if_modified(|state| {
            if state.pending_input.trim().is_empty() {
                return false;
            }
            question = Some(std::mem::take(&mut state.pending_input));
            true
        });
        match question {
            Some(question) => self.ask(&question).await,
            None => AskOutcome::Rejected,
        }
    }

    /// Send a question and append the answer (or an error notice) when it
    /// arrives. Several questions may be in flight at once.
    pub async fn ask(&self, question: &str) -> AskOutcome {
        let question = question.trim();
        if question.is_empty() || self.is_closed() {
            return AskOutcome::Rejected;
        }

        let in_flight = &self.inner.in_flight;
        self.inner.state.send_modify(|state| {
            state.messages.push(ChatMessage::user(question));
            in_flight.fetch_add(1, Ordering::SeqCst);
            state.is_waiting = true;
        });

        let request = ChatRequest {
            message: question.to_string(),
            limit: self.inner.config.source_limit,
        };
        let result = self.inner.service.ask(&self.inner.ctx, &request).await;
        if self.is_closed() {
            return result.map_or_else(AskOutcome::Failed, |reply| {
                AskOutcome::Answered(ChatMessage::assistant(reply.text, reply.sources))
            });
        }

        let (message, outcome) = match result {
            Ok(reply) => {
                tracing::debug!("Assistant answered with {} sources", reply.sources.len());
                let message = ChatMessage::assistant(reply.text, reply.sources);
                (message.clone(), AskOutcome::Answered(message))
            }
            Err(error) => {
                tracing::warn!("Assistant request failed: {}", error);
                (
                    ChatMessage::error(CHAT_ERROR_MESSAGE),
                    AskOutcome::Failed(error),
                )
            }
        };
        self.inner.state.send_modify(|state| {
            state.messages.push(message);
            let remaining = in_flight.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
            state.is_waiting = remaining > 0;
        });
        outcome
    }

    /// Select and scroll to a cited entry. Citations to entries the list
    /// does not know about are ignored.
    pub fn on_source_click(&self, id: EntryId) -> bool {
        let entries = &self.inner.entries;
        if !entries.select(id) {
            tracing::debug!("Ignoring citation of unknown entry {}", id);
            return false;
        }
        entries.request_scroll(id);
        true
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.inner.state.borrow().messages.clone()
    }

    pub fn is_waiting(&self) -> bool {
        self.inner.state.borrow().is_waiting
    }

    pub fn state(&self) -> ChatState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.inner.state.subscribe()
    }

    /// Answers arriving after shutdown are dropped.
    pub fn shutdown(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use tokio::time::sleep;

    use super::*;
    use crate::config::EntrySyncConfig;
    use crate::models::{ChatReply, ChatRole, SourceRef};
    use crate::test_support::{
        entry_at, settle, test_context, MemoryEntryStore, ScriptedChatService,
    };

    async fn loaded_entries() -> EntryListSync {
        let store = MemoryEntryStore::with_entries(vec![
            entry_at(3, 1, "Started the garden"),
            entry_at(7, 5, "Hiked to the ridge with Sam"),
        ]);
        let sync = EntryListSync::new(Arc::new(store), test_context(), EntrySyncConfig::default());
        sync.refresh().await.unwrap();
        sync
    }

    fn session(service: &ScriptedChatService, entries: EntryListSync) -> ChatSession {
        ChatSession::new(
            Arc::new(service.clone()),
            test_context(),
            entries,
            ChatConfig::default(),
        )
    }

    fn reply(text: &str, sources: &[i64]) -> ChatReply {
        ChatReply {
            text: text.to_string(),
            sources: sources
                .iter()
                .map(|id| SourceRef::new(EntryId::new(*id)))
                .collect(),
        }
    }

    #[tokio::test]
    async fn answer_with_sources_is_appended() {
        let service = ScriptedChatService::default();
        service.push_reply(Ok(reply("You hiked with Sam.", &[7])));
        let chat = session(&service, loaded_entries().await);

        let outcome = chat.ask("  When did I go hiking?  ").await;
        assert!(matches!(outcome, AskOutcome::Answered(_)));

        let messages = chat.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ChatMessage::user("When did I go hiking?"));
        assert_eq!(messages[1].role, ChatRole::Assistant);
        assert_eq!(messages[1].sources, vec![SourceRef::new(EntryId::new(7))]);
        assert!(!chat.is_waiting());
        assert_eq!(
            service.requests(),
            vec![ChatRequest {
                message: "When did I go hiking?".to_string(),
                limit: 3,
            }]
        );
    }

    #[tokio::test]
    async fn source_click_selects_known_entry() {
        let entries = loaded_entries().await;
        let chat = session(&ScriptedChatService::default(), entries.clone());

        assert!(chat.on_source_click(EntryId::new(7)));
        let state = entries.state();
        assert_eq!(state.selected, Some(EntryId::new(7)));
        assert_eq!(
            state.scroll_request.map(|request| request.entry_id),
            Some(EntryId::new(7))
        );

        assert!(!chat.on_source_click(EntryId::new(42)));
        let state = entries.state();
        assert_eq!(state.selected, Some(EntryId::new(7)));
        assert_eq!(
            state.scroll_request.map(|request| request.entry_id),
            Some(EntryId::new(7))
        );
    }

    #[tokio::test]
    async fn blank_question_sends_nothing() {
        let service = ScriptedChatService::default();
        let chat = session(&service, loaded_entries().await);

        assert!(matches!(chat.ask("   \n").await, AskOutcome::Rejected));
        chat.set_input("\t");
        assert!(matches!(chat.submit_input().await, AskOutcome::Rejected));

        assert!(chat.messages().is_empty());
        assert!(service.requests().is_empty());
        assert_eq!(chat.state().pending_input, "\t");
    }

    #[tokio::test]
    async fn failure_appends_generic_error() {
        let service = ScriptedChatService::default();
        service.push_reply(Err(Error::Service("model unavailable (503)".to_string())));
        let chat = session(&service, loaded_entries().await);

        let outcome = chat.ask("What did I plant?").await;
        assert!(matches!(outcome, AskOutcome::Failed(Error::Service(_))));

        let messages = chat.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1], ChatMessage::error(CHAT_ERROR_MESSAGE));
        assert!(!chat.is_waiting());
    }

    #[tokio::test]
    async fn unauthenticated_failure_is_returned() {
        let service = ScriptedChatService::default();
        service.push_reply(Err(Error::Unauthenticated("token expired".to_string())));
        let chat = session(&service, loaded_entries().await);

        match chat.ask("Anything new?").await {
            AskOutcome::Failed(error) => assert!(error.is_unauthenticated()),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn submit_input_clears_the_field() {
        let service = ScriptedChatService::default();
        service.push_reply(Ok(reply("Tomatoes.", &[3])));
        let chat = session(&service, loaded_entries().await);

        chat.set_input("What did I plant?");
        assert!(matches!(chat.submit_input().await, AskOutcome::Answered(_)));
        assert_eq!(chat.state().pending_input, "");
        assert_eq!(service.requests()[0].message, "What did I plant?");
    }

    #[tokio::test(start_paused = true)]
    async fn waiting_stays_set_until_every_question_completes() {
        let service = ScriptedChatService::with_delay(Duration::from_millis(500));
        service.push_reply(Ok(reply("First.", &[])));
        service.push_reply(Ok(reply("Second.", &[])));
        let chat = session(&service, loaded_entries().await);

        let first = tokio::spawn({
            let chat = chat.clone();
            async move { chat.ask("one").await }
        });
        settle().await;
        let second = tokio::spawn({
            let chat = chat.clone();
            async move { chat.ask("two").await }
        });
        settle().await;

        assert!(chat.is_waiting());
        assert_eq!(chat.messages().len(), 2);

        first.await.unwrap();
        assert!(chat.is_waiting());
        second.await.unwrap();
        assert!(!chat.is_waiting());

        let roles = chat
            .messages()
            .iter()
            .map(|message| message.role)
            .collect::<Vec<_>>();
        assert_eq!(
            roles,
            vec![
                ChatRole::User,
                ChatRole::User,
                ChatRole::Assistant,
                ChatRole::Assistant
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn answers_after_shutdown_are_dropped() {
        let service = ScriptedChatService::with_delay(Duration::from_millis(500));
        service.push_reply(Ok(reply("Late.", &[])));
        let chat = session(&service, loaded_entries().await);

        let pending = tokio::spawn({
            let chat = chat.clone();
            async move { chat.ask("hello?").await }
        });
        settle().await;
        chat.shutdown();
        sleep(Duration::from_millis(600)).await;
        pending.await.unwrap();

        assert_eq!(chat.messages(), vec![ChatMessage::user("hello?")]);
        assert!(matches!(chat.ask("again").await, AskOutcome::Rejected));
    }
}
