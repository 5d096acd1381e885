//! Command-line configuration

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::{access::AccessArgs, quote::QuoteArgs};

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,
}

/// Tiller point-of-sale CLI
#[derive(Debug, Parser)]
#[command(name = "tiller", about = "Tiller point-of-sale CLI", long_about = None)]
pub struct Cli {
    /// Directory holding the products, users, orders and settings fixtures
    #[arg(long, env = "TILLER_FIXTURES", default_value = "./fixtures", global = true)]
    pub fixtures: PathBuf,

    #[command(flatten)]
    pub logging: LoggingConfig,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Price an order and print its receipt
    Quote(QuoteArgs),

    /// Resolve application paths for a user
    Access(AccessArgs),
}

impl Cli {
    /// Load configuration from the environment and command-line arguments.
    ///
    /// A `.env` file is read first when present.
    pub fn load() -> Self {
        _ = dotenvy::dotenv();

        Self::parse()
    }
}
