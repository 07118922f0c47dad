//! Display helpers shared by every front end.

use chrono::{DateTime, Utc};

use crate::models::JournalEntry;

/// Characters of content shown in list previews.
pub const PREVIEW_CHARS: usize = 100;

/// The first [`PREVIEW_CHARS`] characters of an entry, with `...` appended
/// when something was cut off.
pub fn entry_preview(entry: &JournalEntry) -> String {
    truncate_chars(&entry.content, PREVIEW_CHARS)
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let mut truncated = chars.by_ref().take(max_chars).collect::<String>();
    if chars.next().is_some() {
        truncated.push_str("...");
    }
    truncated
}

/// "Just now", "5m ago", "3h ago", or an absolute date and time after a day.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else {
        then.format("%b %-d, %Y, %I:%M %p").to_string()
    }
}

pub fn format_entry_date(created_at: DateTime<Utc>) -> String {
    created_at.format("%b %-d, %Y").to_string()
}
