use std::path::Path;

use journal_core::api::EntryStore;
use journal_core::models::EntryPayload;

use crate::commands::common::{connect, resolve_entry_content};
use crate::error::CliError;

pub async fn run_add(content_parts: &[String], config_path: &Path) -> Result<(), CliError> {
    let content = resolve_entry_content(content_parts)?;

    let connection = connect(config_path)?;
    let entry = connection
        .client
        .create(&connection.ctx, &EntryPayload::final_entry(content))
        .await?;

    println!("{}", entry.id);
    Ok(())
}
