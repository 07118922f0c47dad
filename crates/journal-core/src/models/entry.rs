//! Journal entry model

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned identifier of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(i64);

impl EntryId {
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// How a user refers to an entry: `#3` is the label shown in lists and
/// citations, a bare number is the server id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRef {
    Label(i64),
    Id(EntryId),
}

impl FromStr for EntryRef {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.strip_prefix('#') {
            Some(number) => Ok(Self::Label(number.trim().parse()?)),
            None => Ok(Self::Id(s.parse()?)),
        }
    }
}

impl From<i64> for EntryId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A journal entry as known to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier, immutable once created
    pub id: EntryId,
    /// Per-user sequential number shown to the user
    pub display_id: Option<i64>,
    /// Plain text content
    pub content: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp, when the backend reports one
    pub updated_at: Option<DateTime<Utc>>,
    /// Auto-saved but not yet finalized by the user
    pub is_draft: bool,
}

impl JournalEntry {
    /// Number shown to the user, falling back to the server id
    #[must_use]
    pub fn display_number(&self) -> i64 {
        self.display_id.unwrap_or(self.id.get())
    }

    /// `#<number>` label used in lists and citations
    #[must_use]
    pub fn label(&self) -> String {
        format!("#{}", self.display_number())
    }

    /// Check if entry content is empty (whitespace-only counts as empty)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Body of a create/update request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPayload {
    pub content: String,
    pub is_draft: bool,
}

impl EntryPayload {
    #[must_use]
    pub fn draft(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_draft: true,
        }
    }

    #[must_use]
    pub fn final_entry(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_draft: false,
        }
    }
}
