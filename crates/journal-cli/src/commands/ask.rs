use std::path::Path;

use journal_core::chat::AskOutcome;

use crate::commands::common::{connect, format_sources, normalize_question};
use crate::error::CliError;

pub async fn run_ask(question_parts: &[String], config_path: &Path) -> Result<(), CliError> {
    let question = normalize_question(question_parts)?;
    let connection = connect(config_path)?;
    let page = connection.page();
    // Loaded so citations can be shown with their entry numbers.
    page.open().await?;

    let outcome = page.chat().ask(&question).await;
    page.shutdown();
    match outcome {
        AskOutcome::Answered(message) => {
            println!("{}", message.text);
            if let Some(sources) = format_sources(&message, &page.entries().snapshot()) {
                println!("\n{sources}");
            }
            Ok(())
        }
        AskOutcome::Failed(error) => Err(error.into()),
        AskOutcome::Rejected => Err(CliError::EmptyQuestion),
    }
}
