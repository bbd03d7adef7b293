//! Input-mapping error types.

use std::path::PathBuf;

/// Errors that can occur while loading an input mapping.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// The mapping file could not be read.
    #[error("failed to read input mapping {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The mapping is not valid JSON or names an unknown action.
    #[error("failed to parse input mapping: {0}")]
    Parse(#[from] serde_json::Error),
}
