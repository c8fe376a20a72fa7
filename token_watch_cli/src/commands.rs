use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "token-watch")]
#[command(about = "Track a token's balance and USD value across a list of wallets")]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "TOKEN_WATCH_CONFIG_PATH", default_value = "config.toml")]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Live dashboard, refreshed on the configured interval (Ctrl-C to exit)
    Watch {
        /// Run a single refresh cycle, print the table and exit
        #[arg(long)]
        once: bool,
    },

    /// List tracked wallets
    List {
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Track a wallet and refresh once
    Add {
        address: String,
        #[arg(short, long, default_value = "")]
        name: String,
        /// Cost basis per token in USD
        #[arg(long, default_value_t = 0.0)]
        cost: f64,
    },

    /// Stop tracking a wallet
    Remove { address: String },

    /// Remove every tracked wallet
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Resolve the current USD price
    Price,

    /// Show the token contract's on-chain symbol and decimals
    Token,

    /// Show or toggle the display theme
    Theme {
        #[arg(long)]
        toggle: bool,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completion scripts
    Completion {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show {
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Validate configuration
    Validate {
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Write the effective configuration to a TOML file
    Init {
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
