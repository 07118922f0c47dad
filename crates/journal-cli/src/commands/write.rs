use std::path::Path;
use std::sync::Arc;

use journal_core::api::EntryStore;
use journal_core::autosave::{DraftAutosaveController, DraftState};
use journal_core::entries::EntryListSync;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use crate::commands::common::{connect, status_line};
use crate::error::CliError;

pub async fn run_write(transcript: Option<&Path>, config_path: &Path) -> Result<(), CliError> {
    let connection = connect(config_path)?;
    let store: Arc<dyn EntryStore> = connection.client.clone();
    let entries = EntryListSync::new(
        store.clone(),
        connection.ctx.clone(),
        connection.config.entries,
    );
    let editor = DraftAutosaveController::new(
        store,
        connection.ctx.clone(),
        connection.config.autosave,
        Arc::new(entries.clone()),
    );
    let reporter = tokio::spawn(report_status(editor.subscribe()));

    let mut content = String::new();
    if let Some(path) = transcript {
        content = std::fs::read_to_string(path)?.trim_end().to_string();
        editor.apply_transcript(content.clone());
        println!("{content}");
    }

    eprintln!("Write your entry. A line with a single '.' (or Ctrl-D) saves it.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == "." {
            break;
        }
        if !content.is_empty() {
            content.push('\n');
        }
        content.push_str(&line);
        editor.on_content_change(content.clone());
    }

    let result = editor.submit_final().await;
    editor.shutdown();
    entries.shutdown();
    reporter.abort();

    let entry = result?;
    println!("Saved entry {} ({})", entry.label(), entry.id);
    Ok(())
}

/// Print save status transitions to stderr while the user types.
async fn report_status(mut updates: watch::Receiver<DraftState>) {
    let mut last_line = None;
    while updates.changed().await.is_ok() {
        let line = status_line(&updates.borrow_and_update());
        if line.is_some() && line != last_line {
            if let Some(text) = &line {
                eprintln!("[{text}]");
            }
        }
        last_line = line;
    }
}
