//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::ReplayFailed { line, source } => {
            format!("journal line {} rejected: {}", line, source)
        }
        other => other.to_string(),
    }
}
