use std::path::Path;

use crate::auth::JournalAuthService;
use crate::cli::AuthCommands;
use crate::config::load_config;
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands, config_path: &Path) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let auth_service = JournalAuthService::new(&config)?;

    match command {
        AuthCommands::Login { username, password } => {
            let session = auth_service
                .login(&username, &password)
                .await
                .map_err(|error| CliError::Auth(error.to_string()))?;
            println!(
                "Signed in to {} as {}",
                config.api_base_url, session.user.username
            );
        }
        AuthCommands::Register { username, password } => {
            let session = auth_service
                .register(&username, &password)
                .await
                .map_err(|error| CliError::Auth(error.to_string()))?;
            println!(
                "Registered and signed in to {} as {}",
                config.api_base_url, session.user.username
            );
        }
        AuthCommands::Status => match auth_service.restore_session()? {
            Some(session) => {
                let expiry = session
                    .expires_at()
                    .and_then(|expires_at| chrono::DateTime::from_timestamp(expires_at, 0))
                    .map_or_else(
                        || "no expiry".to_string(),
                        |expires_at| format!("expires {}", expires_at.format("%Y-%m-%d %H:%M UTC")),
                    );
                println!(
                    "Signed in to {} as {} ({expiry})",
                    config.api_base_url, session.user.username
                );
            }
            None => println!("Not signed in to {}", config.api_base_url),
        },
        AuthCommands::Logout => {
            auth_service.logout()?;
            println!("Signed out of {}", config.api_base_url);
        }
    }

    Ok(())
}
