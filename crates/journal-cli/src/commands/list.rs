use std::path::Path;

use chrono::Utc;
use journal_core::api::EntryStore;

use crate::commands::common::{connect, entry_to_list_item, format_entry_lines, EntryListItem};
use crate::error::CliError;

pub async fn run_list(limit: usize, as_json: bool, config_path: &Path) -> Result<(), CliError> {
    let connection = connect(config_path)?;
    let mut entries = connection.client.list(&connection.ctx).await?;
    entries.truncate(limit);
    let now = Utc::now();

    if as_json {
        let json_items = entries
            .iter()
            .map(|entry| entry_to_list_item(entry, now))
            .collect::<Vec<EntryListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_entry_lines(&entries, now) {
            println!("{line}");
        }
    }

    Ok(())
}
