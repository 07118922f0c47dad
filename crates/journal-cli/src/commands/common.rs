use std::io::{self, IsTerminal, Read};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use journal_core::api::HttpJournalClient;
use journal_core::autosave::{DraftState, SaveStatus};
use journal_core::config::ClientConfig;
use journal_core::entries::EntrySnapshot;
use journal_core::format::{entry_preview, format_entry_date, relative_time, truncate_chars};
use journal_core::page::JournalPage;
use journal_core::api::EntryStore;
use journal_core::{ChatMessage, EntryId, EntryRef, JournalEntry, RequestContext};
use serde::Serialize;

use crate::auth::JournalAuthService;
use crate::config::load_config;
use crate::error::CliError;

/// Everything an authenticated command needs to talk to the API.
pub struct Connection {
    pub config: ClientConfig,
    pub client: Arc<HttpJournalClient>,
    pub ctx: RequestContext,
}

impl Connection {
    pub fn page(&self) -> JournalPage {
        JournalPage::new(
            self.client.clone(),
            self.client.clone(),
            self.ctx.clone(),
            &self.config,
        )
    }
}

pub fn connect(config_path: &Path) -> Result<Connection, CliError> {
    let config = load_config(config_path)?;
    let session = JournalAuthService::new(&config)?
        .restore_session()?
        .ok_or(CliError::NotSignedIn)?;
    let client = Arc::new(HttpJournalClient::new(&config)?);
    tracing::debug!("Connected to {} as {}", client.base_url(), session.user.username);
    Ok(Connection {
        config,
        client,
        ctx: session.request_context(),
    })
}

#[derive(Debug, Serialize)]
pub struct EntryListItem {
    pub id: EntryId,
    pub label: String,
    pub preview: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub relative_time: String,
    pub is_draft: bool,
}

pub fn entry_to_list_item(entry: &JournalEntry, now: DateTime<Utc>) -> EntryListItem {
    EntryListItem {
        id: entry.id,
        label: entry.label(),
        preview: entry_preview(entry),
        content: entry.content.clone(),
        created_at: entry.created_at,
        relative_time: relative_time(entry.created_at, now),
        is_draft: entry.is_draft,
    }
}

pub fn format_entry_lines(entries: &[JournalEntry], now: DateTime<Utc>) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let first_line = entry.content.lines().next().unwrap_or("").trim();
            let preview = truncate_chars(first_line, 48);
            let when = relative_time(entry.created_at, now);
            let line = format!("{:>6}  {:<51}  {when}", entry.label(), preview);
            if entry.is_draft {
                format!("{line}  [draft]")
            } else {
                line
            }
        })
        .collect()
}

pub fn render_entry(entry: &JournalEntry) -> String {
    let draft = if entry.is_draft { " (draft)" } else { "" };
    format!(
        "{}  {}{draft}\n\n{}",
        entry.label(),
        format_entry_date(entry.created_at),
        entry.content.trim_end()
    )
}

/// Citation line for an assistant answer, using the entry labels known to
/// `snapshot` and the raw id for anything it does not contain.
pub fn format_sources(message: &ChatMessage, snapshot: &EntrySnapshot) -> Option<String> {
    if message.sources.is_empty() {
        return None;
    }
    let labels = message
        .sources
        .iter()
        .map(|source| {
            let label = snapshot
                .get(source.entry_id)
                .map_or_else(|| format!("id {}", source.entry_id), JournalEntry::label);
            match source.similarity {
                Some(similarity) => format!("{label} ({similarity:.2})"),
                None => label,
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!("Sources: {labels}"))
}

pub fn status_line(state: &DraftState) -> Option<String> {
    match state.status {
        SaveStatus::Idle => None,
        SaveStatus::Saving => Some("Saving...".to_string()),
        SaveStatus::Saved => Some(
            state
                .message
                .clone()
                .unwrap_or_else(|| "Draft saved".to_string()),
        ),
        SaveStatus::Error => Some(
            state
                .message
                .clone()
                .unwrap_or_else(|| "Draft auto-save failed".to_string()),
        ),
    }
}

pub fn resolve_entry_content(content_parts: &[String]) -> Result<String, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(content);
    }

    if let Some(content) = read_piped_stdin()? {
        return Ok(content);
    }

    Err(CliError::EmptyContent)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_question(parts: &[String]) -> Result<String, CliError> {
    normalize_content(&parts.join(" ")).ok_or(CliError::EmptyQuestion)
}

/// Parse `#3` (a printed label) or `118` (a server id).
pub fn parse_entry_ref(raw: &str) -> Result<EntryRef, CliError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CliError::EmptyEntryId);
    }
    trimmed
        .parse::<EntryRef>()
        .map_err(|_| CliError::InvalidEntryId(trimmed.to_string()))
}

/// Server id for a user-supplied reference; labels need the entry list.
pub async fn resolve_entry_ref(
    connection: &Connection,
    reference: EntryRef,
) -> Result<EntryId, CliError> {
    match reference {
        EntryRef::Id(id) => Ok(id),
        EntryRef::Label(number) => {
            let entries = connection.client.list(&connection.ctx).await?;
            EntrySnapshot::new(entries)
                .resolve(reference)
                .map(|entry| entry.id)
                .ok_or_else(|| CliError::UnknownEntry(format!("#{number}")))
        }
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}
