//! Error types for the veil runtime.

use thiserror::Error;

/// Errors surfaced by the settings store.
///
/// Extraction and masking never error: a failed strategy is a miss and a
/// stale node is skipped. Only storage I/O and encoding can fail.
#[derive(Debug, Error)]
pub enum VeilError {
    #[error("settings io: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings encode: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result alias for store operations.
pub type VeilResult<T> = Result<T, VeilError>;
