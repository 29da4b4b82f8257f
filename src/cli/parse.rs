//! CLI parse: clap types for syncpath. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// syncpath - replay and inspect path-indexed sync state journals
#[derive(Parser)]
#[command(name = "syncpath")]
#[command(about = "Replay sync journals against a path-indexed store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the user config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Index root path (overrides index.root)
    #[arg(long)]
    pub root: Option<String>,

    /// Segment comparison: exact, case_insensitive, nfc (overrides index.comparison)
    #[arg(long)]
    pub comparison: Option<String>,

    /// Enable logging at debug level
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Replay a journal and print the resulting entries and notifications
    Replay {
        /// JSON-lines journal file
        journal: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
        /// Stop at the first rejected operation
        #[arg(long)]
        strict: bool,
    },
    /// Replay a journal strictly and verify the store's structure
    Check {
        /// JSON-lines journal file
        journal: PathBuf,
    },
    /// Print the effective configuration as JSON
    Config,
}
