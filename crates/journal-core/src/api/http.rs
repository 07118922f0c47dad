//! REST client for the journal backend.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use super::{ChatService, EntryStore};
use crate::auth::{parse_api_error, RequestContext};
use crate::config::{normalize_api_base_url, ClientConfig};
use crate::error::{Error, Result};
use crate::models::{ChatReply, ChatRequest, EntryId, EntryPayload, JournalEntry, SourceRef};

/// HTTP implementation of [`EntryStore`] and [`ChatService`].
///
/// Holds no credentials; every call authenticates with the bearer token of
/// the [`RequestContext`] it is given.
#[derive(Debug, Clone)]
pub struct HttpJournalClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpJournalClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = normalize_api_base_url(&config.api_base_url)?;
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, request: RequestBuilder, ctx: &RequestContext) -> RequestBuilder {
        request
            .bearer_auth(ctx.access_token())
            .header(reqwest::header::ACCEPT, "application/json")
    }

    fn entries_url(&self) -> String {
        format!("{}/api/entries", self.base_url)
    }

    fn entry_url(&self, id: EntryId) -> String {
        format!("{}/api/entries/{id}", self.base_url)
    }

    async fn read_entry(response: Response, id: Option<EntryId>) -> Result<JournalEntry> {
        let response = check_status(response, id).await?;
        response.json::<WireEntry>().await?.try_into()
    }
}

#[async_trait]
impl EntryStore for HttpJournalClient {
    async fn list(&self, ctx: &RequestContext) -> Result<Vec<JournalEntry>> {
        let response = self
            .authorized(self.client.get(self.entries_url()), ctx)
            .send()
            .await?;
        let response = check_status(response, None).await?;
        let entries = response
            .json::<Vec<WireEntry>>()
            .await?
            .into_iter()
            .map(JournalEntry::try_from)
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!("Fetched {} entries", entries.len());
        Ok(entries)
    }

    async fn get(&self, ctx: &RequestContext, id: EntryId) -> Result<JournalEntry> {
        let response = self
            .authorized(self.client.get(self.entry_url(id)), ctx)
            .send()
            .await?;
        Self::read_entry(response, Some(id)).await
    }

    async fn create(&self, ctx: &RequestContext, payload: &EntryPayload) -> Result<JournalEntry> {
        let response = self
            .authorized(self.client.post(self.entries_url()), ctx)
            .json(payload)
            .send()
            .await?;
        Self::read_entry(response, None).await
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        id: EntryId,
        payload: &EntryPayload,
    ) -> Result<JournalEntry> {
        let response = self
            .authorized(self.client.put(self.entry_url(id)), ctx)
            .json(payload)
            .send()
            .await?;
        Self::read_entry(response, Some(id)).await
    }

    async fn delete(&self, ctx: &RequestContext, id: EntryId) -> Result<()> {
        let response = self
            .authorized(self.client.delete(self.entry_url(id)), ctx)
            .send()
            .await?;
        check_status(response, Some(id)).await?;
        Ok(())
    }
}

#[async_trait]
impl ChatService for HttpJournalClient {
    async fn ask(&self, ctx: &RequestContext, request: &ChatRequest) -> Result<ChatReply> {
        let response = self
            .authorized(self.client.post(format!("{}/api/chat/", self.base_url)), ctx)
            .json(request)
            .send()
            .await?;
        let response = check_status(response, None).await?;
        response.json::<WireChatReply>().await?.try_into()
    }
}

async fn check_status(response: Response, id: Option<EntryId>) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(map_status_error(status, &body, id))
}

fn map_status_error(status: StatusCode, body: &str, id: Option<EntryId>) -> Error {
    match (status, id) {
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => {
            Error::Unauthenticated(parse_api_error(status, body))
        }
        (StatusCode::NOT_FOUND, Some(id)) => Error::NotFound(id),
        _ => Error::Service(parse_api_error(status, body)),
    }
}

#[derive(Debug, Deserialize)]
struct WireEntry {
    entry_id: i64,
    #[serde(default)]
    user_entry_id: Option<i64>,
    content: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    is_draft: Option<bool>,
}

impl TryFrom<WireEntry> for JournalEntry {
    type Error = Error;

    fn try_from(value: WireEntry) -> Result<Self> {
        let created_at = match value.created_at.as_deref() {
            Some(raw) => parse_timestamp(raw)?,
            None => {
                tracing::debug!("Entry {} has no created_at", value.entry_id);
                DateTime::<Utc>::UNIX_EPOCH
            }
        };
        let updated_at = value
            .updated_at
            .as_deref()
            .map(parse_timestamp)
            .transpose()?;

        Ok(Self {
            id: EntryId::new(value.entry_id),
            display_id: value.user_entry_id,
            content: value.content,
            created_at,
            updated_at,
            is_draft: value.is_draft.unwrap_or(false),
        })
    }
}

/// ISO-8601 with or without an offset; offset-less values are UTC.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|error| Error::Service(format!("invalid timestamp '{raw}': {error}")))
}

#[derive(Debug, Deserialize)]
struct WireChatReply {
    response: Option<String>,
    #[serde(default)]
    sources: Vec<WireSource>,
}

#[derive(Debug, Deserialize)]
struct WireSource {
    entry_id: i64,
    #[serde(default)]
    similarity: Option<f32>,
}

impl TryFrom<WireChatReply> for ChatReply {
    type Error = Error;

    fn try_from(value: WireChatReply) -> Result<Self> {
        let text = value
            .response
            .ok_or_else(|| Error::Service("chat response did not include text".to_string()))?;
        let sources = value
            .sources
            .into_iter()
            .map(|source| SourceRef {
                entry_id: EntryId::new(source.entry_id),
                similarity: source.similarity,
            })
            .collect();
        Ok(Self { text, sources })
    }
}
