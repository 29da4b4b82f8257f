//! Configuration System
//!
//! Layered configuration for the `syncpath` tool: which root path the index
//! covers, how path segments are compared, and how logging is set up.
//! The store library itself takes plain constructor arguments and never reads
//! configuration.

use crate::comparer::{Comparison, ConfiguredComparer};
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::path::FilePath;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod sources;

pub use sources::user_config_path;

pub(crate) const DEFAULT_ROOT: &str = "sync";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncPathConfig {
    /// Index settings
    #[serde(default)]
    pub index: IndexConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the path index being replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Root path of the index, '/'-separated
    #[serde(default = "default_root")]
    pub root: String,

    /// Segment comparison mode
    #[serde(default)]
    pub comparison: Comparison,
}

fn default_root() -> String {
    DEFAULT_ROOT.to_string()
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            comparison: Comparison::default(),
        }
    }
}

impl IndexConfig {
    pub fn root_path(&self) -> Result<FilePath, ApiError> {
        Ok(FilePath::parse(&self.root)?)
    }

    pub fn comparer(&self) -> ConfiguredComparer {
        ConfiguredComparer::new(self.comparison)
    }
}

impl SyncPathConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ApiError> {
        self.index
            .root_path()
            .map_err(|e| ApiError::ConfigError(format!("index.root: {}", e)))?;
        self.logging
            .validate()
            .map_err(ApiError::ConfigError)?;
        Ok(())
    }
}

/// Loads [`SyncPathConfig`] from defaults, files and environment.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration, optionally layering an explicit file over the
    /// user config file.
    pub fn load(config_file: Option<&Path>) -> Result<SyncPathConfig, ApiError> {
        let mut builder = sources::builder_with_defaults()?;
        builder = sources::add_user_file(builder)?;
        if let Some(path) = config_file {
            builder = sources::add_explicit_file(builder, path)?;
        }
        builder = sources::add_environment(builder)?;

        let config: SyncPathConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a single file on top of the defaults, without
    /// user file or environment layers.
    pub fn load_from_file(path: &Path) -> Result<SyncPathConfig, ApiError> {
        let builder = sources::add_explicit_file(sources::builder_with_defaults()?, path)?;
        let config: SyncPathConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
