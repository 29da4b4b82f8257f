//! CLI route: run context and command dispatch.

use crate::cli::parse::Commands;
use crate::cli::presentation::{format_replay_json, format_replay_text};
use crate::comparer::Comparison;
use crate::config::{ConfigLoader, SyncPathConfig};
use crate::error::ApiError;
use crate::replay::{parse_journal, JournalEntry, Replayer};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Runtime context for CLI execution: the effective configuration.
pub struct RunContext {
    config: SyncPathConfig,
}

impl RunContext {
    /// Load configuration and apply command-line index overrides.
    pub fn new(
        config_path: Option<PathBuf>,
        root: Option<String>,
        comparison: Option<String>,
    ) -> Result<Self, ApiError> {
        let mut config = ConfigLoader::load(config_path.as_deref())?;
        if let Some(root) = root {
            config.index.root = root;
        }
        if let Some(comparison) = comparison {
            config.index.comparison = parse_comparison(&comparison)?;
        }
        config.validate()?;
        Ok(Self { config })
    }

    /// Context over an already-loaded configuration.
    pub fn from_config(config: SyncPathConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SyncPathConfig {
        &self.config
    }

    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Replay {
                journal,
                format,
                strict,
            } => self.handle_replay(journal, format, *strict),
            Commands::Check { journal } => self.handle_check(journal),
            Commands::Config => serde_json::to_string_pretty(&self.config)
                .map_err(|e| ApiError::ConfigError(e.to_string())),
        }
    }

    fn handle_replay(&self, journal: &Path, format: &str, strict: bool) -> Result<String, ApiError> {
        if format != "text" && format != "json" {
            return Err(ApiError::ConfigError(format!(
                "Invalid format: {} (must be 'text' or 'json')",
                format
            )));
        }
        let entries = read_journal(journal)?;
        let mut replayer = Replayer::new(&self.config.index)?;
        if strict {
            replayer.apply_strict(&entries)?;
        } else {
            replayer.apply_all(&entries);
        }
        let report = replayer.report();
        Ok(if format == "json" {
            format_replay_json(&report)
        } else {
            format_replay_text(&report)
        })
    }

    fn handle_check(&self, journal: &Path) -> Result<String, ApiError> {
        let entries = read_journal(journal)?;
        let mut replayer = Replayer::new(&self.config.index)?;
        replayer.apply_strict(&entries)?;
        let store = replayer.store();
        info!(entries = store.len(), "journal check passed");
        Ok(format!(
            "ok: {} operations, {} entries under {}",
            entries.len(),
            store.len(),
            store.root_path()
        ))
    }
}

fn read_journal(path: &Path) -> Result<Vec<JournalEntry>, ApiError> {
    debug!(journal = %path.display(), "reading journal");
    let text = std::fs::read_to_string(path)?;
    parse_journal(&text)
}

fn parse_comparison(value: &str) -> Result<Comparison, ApiError> {
    match value {
        "exact" => Ok(Comparison::Exact),
        "case_insensitive" => Ok(Comparison::CaseInsensitive),
        "nfc" => Ok(Comparison::Nfc),
        other => Err(ApiError::ConfigError(format!(
            "Invalid comparison: {} (must be 'exact', 'case_insensitive', or 'nfc')",
            other
        ))),
    }
}
