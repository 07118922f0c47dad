use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "journal")]
#[command(about = "Write, auto-save, and ask questions about your journal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to the CLI config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Quick capture: journal "today I..."
    #[arg(trailing_var_arg = true)]
    pub entry: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save a finished entry
    #[command(alias = "new")]
    Add {
        /// Entry content (read from stdin when omitted)
        content: Vec<String>,
    },
    /// Write an entry interactively with draft auto-save
    Write {
        /// Start from a transcript file instead of an empty draft
        #[arg(long, value_name = "PATH")]
        transcript: Option<PathBuf>,
    },
    /// List recent entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a single entry
    Show {
        /// Entry label such as `#3`, or a server id
        id: String,
    },
    /// Delete an entry
    Delete {
        /// Entry label such as `#3`, or a server id
        id: String,
    },
    /// Ask the assistant a question about your entries
    Ask {
        /// Question text
        question: Vec<String>,
    },
    /// Start an interactive conversation with the assistant
    Chat,
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Configure the journal API endpoint and timings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Sign in to the journal API
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Create or update the config file
    Init {
        /// Journal API base URL
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
        /// HTTP timeout in seconds
        #[arg(long, value_name = "SECONDS")]
        timeout_secs: Option<u64>,
    },
    /// Print the effective configuration
    Show,
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in and store the session in the keychain
    Login {
        #[arg(long, value_name = "NAME")]
        username: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long, value_name = "NAME")]
        username: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Show whether a session is stored
    Status,
    /// Forget the stored session
    Logout,
}
