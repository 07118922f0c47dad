use std::path::Path;

use journal_core::api::EntryStore;

use crate::commands::common::{connect, parse_entry_ref, render_entry, resolve_entry_ref};
use crate::error::CliError;

pub async fn run_show(id: &str, config_path: &Path) -> Result<(), CliError> {
    let reference = parse_entry_ref(id)?;
    let connection = connect(config_path)?;
    let entry_id = resolve_entry_ref(&connection, reference).await?;
    let entry = connection.client.get(&connection.ctx, entry_id).await?;

    println!("{}", render_entry(&entry));
    Ok(())
}
