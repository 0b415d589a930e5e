//! Error types for the sync core.

use thiserror::Error;

/// Failures of a sync run. A fetch failure aborts the run before any note is
/// touched, so storage is never left partially written.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Fetch(#[from] habitica::HabiticaError),

    #[error("note folder '{path}' exists but is not a folder")]
    NotAFolder { path: String },

    #[error("failed to create note folder '{path}': {reason}")]
    CreateFolder { path: String, reason: String },

    #[error("failed to write note '{path}': {reason}")]
    WriteNote { path: String, reason: String },
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
