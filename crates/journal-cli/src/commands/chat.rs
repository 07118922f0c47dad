use std::io::Write;
use std::path::Path;

use journal_core::chat::{AskOutcome, CHAT_ERROR_MESSAGE};
use journal_core::page::{ActiveTab, JournalPage};
use journal_core::EntryRef;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::common::{connect, format_sources, parse_entry_ref, render_entry};
use crate::error::CliError;

#[derive(Debug, PartialEq, Eq)]
pub enum ChatCommand {
    Quit,
    Open(EntryRef),
    Ask(String),
    Empty,
}

pub fn parse_chat_command(line: &str) -> Result<ChatCommand, CliError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ChatCommand::Empty);
    }
    if matches!(line, ":q" | ":quit" | ":exit") {
        return Ok(ChatCommand::Quit);
    }
    if let Some(id) = line.strip_prefix(":open") {
        return parse_entry_ref(id).map(ChatCommand::Open);
    }
    Ok(ChatCommand::Ask(line.to_string()))
}

fn describe_ref(reference: EntryRef) -> String {
    match reference {
        EntryRef::Label(number) => format!("Entry #{number}"),
        EntryRef::Id(id) => format!("Entry id {id}"),
    }
}

pub async fn run_chat(config_path: &Path) -> Result<(), CliError> {
    let connection = connect(config_path)?;
    let mut page = connection.page();
    page.open().await?;
    page.set_active_tab(ActiveTab::Chat);

    eprintln!("Ask about your journal. `:open #<n>` shows a cited entry, `:quit` exits.");
    let result = chat_loop(&mut page).await;
    page.shutdown();
    result
}

async fn chat_loop(page: &mut JournalPage) -> Result<(), CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };

        let command = match parse_chat_command(&line) {
            Ok(command) => command,
            Err(error) => {
                eprintln!("{error}");
                continue;
            }
        };
        match command {
            ChatCommand::Quit => return Ok(()),
            ChatCommand::Empty => {}
            ChatCommand::Open(reference) => {
                let target = page.entries().snapshot().resolve(reference).map(|entry| entry.id);
                match target {
                    Some(id) if page.open_source(id) => {
                        if let Some(entry) = page.entries().selected_entry() {
                            println!("{}\n", render_entry(&entry));
                        }
                    }
                    _ => println!("{} is not in your journal.", describe_ref(reference)),
                }
            }
            ChatCommand::Ask(question) => {
                page.chat().set_input(question);
                match page.chat().submit_input().await {
                    AskOutcome::Answered(message) => {
                        println!("{}", message.text);
                        if let Some(sources) =
                            format_sources(&message, &page.entries().snapshot())
                        {
                            println!("{sources}");
                        }
                        println!();
                    }
                    AskOutcome::Failed(error) if error.is_unauthenticated() => {
                        return Err(error.into());
                    }
                    AskOutcome::Failed(_) => println!("{CHAT_ERROR_MESSAGE}\n"),
                    AskOutcome::Rejected => {}
                }
            }
        }
    }
}
