//! Journal CLI - write and query your journal from the terminal

mod auth;
mod cli;
mod commands;
mod config;
mod error;


use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::ask::run_ask;
use crate::commands::auth_cmd::run_auth;
use crate::commands::chat::run_chat;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::list::run_list;
use crate::commands::show::run_show;
use crate::commands::write::run_write;
use crate::config::resolve_config_path;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let directive = "journal=info"
        .parse()
        .map_err(|error| CliError::Config(format!("invalid log directive: {error}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config)?;

    match cli.command {
        Some(Commands::Add { content }) => run_add(&content, &config_path).await?,
        Some(Commands::Write { transcript }) => {
            run_write(transcript.as_deref(), &config_path).await?;
        }
        Some(Commands::List { limit, json }) => run_list(limit, json, &config_path).await?,
        Some(Commands::Show { id }) => run_show(&id, &config_path).await?,
        Some(Commands::Delete { id }) => run_delete(&id, &config_path).await?,
        Some(Commands::Ask { question }) => run_ask(&question, &config_path).await?,
        Some(Commands::Chat) => run_chat(&config_path).await?,
        Some(Commands::Completions { shell, output }) => {
            run_completions(shell, output.as_deref())?;
        }
        Some(Commands::Config { command }) => run_config(command, &config_path)?,
        Some(Commands::Auth { command }) => run_auth(command, &config_path).await?,
        None => {
            if cli.entry.is_empty() {
                Cli::command().print_help().map_err(CliError::Io)?;
                println!();
            } else {
                run_add(&cli.entry, &config_path).await?;
            }
        }
    }

    Ok(())
}
