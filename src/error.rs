//! Error types for the path-indexed sync state store.

use crate::path::FilePath;
use std::fmt;
use thiserror::Error;

/// Why a key was rejected as invalid for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidKeyReason {
    /// The key does not live under the store's root path.
    OutsideRoot,
    /// Rename source and destination are the same key.
    SameKey,
    /// The store's own root path cannot be renamed.
    RootRename,
    /// A subtree cannot be moved underneath itself.
    DestinationInsideSource,
}

impl fmt::Display for InvalidKeyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            InvalidKeyReason::OutsideRoot => "not a descendant of the store root",
            InvalidKeyReason::SameKey => "source and destination are the same key",
            InvalidKeyReason::RootRename => "the root path cannot be renamed",
            InvalidKeyReason::DestinationInsideSource => "destination lies inside the source subtree",
        };
        f.write_str(text)
    }
}

/// Store operation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Key not found: {0}")]
    KeyNotFound(FilePath),

    #[error("Key already exists: {0}")]
    KeyAlreadyExists(FilePath),

    #[error("Invalid key {key}: {reason}")]
    InvalidKey {
        key: FilePath,
        reason: InvalidKeyReason,
    },

    /// Count or structural invariant violated. Indicates the store was
    /// mutated without the caller's external locking; not recoverable.
    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),
}

impl StoreError {
    pub(crate) fn invalid(key: &FilePath, reason: InvalidKeyReason) -> Self {
        StoreError::InvalidKey {
            key: key.clone(),
            reason,
        }
    }
}

/// Path construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Path has no segments: {0:?}")]
    Empty(String),

    #[error("Invalid path segment name: {0:?}")]
    InvalidName(String),
}

/// Top-level errors for configuration, logging setup, journal replay and the CLI.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Path error: {0}")]
    PathError(#[from] PathError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Journal line {line}: {message}")]
    JournalError { line: usize, message: String },

    #[error("Journal line {line}: {source}")]
    ReplayFailed { line: usize, source: StoreError },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
