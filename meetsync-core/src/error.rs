//! Error types for meetsync.

use thiserror::Error;

/// Errors that can occur while syncing or alerting.
#[derive(Error, Debug)]
pub enum MeetSyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Calendar source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Malformed calendar record: {0}")]
    MalformedRecord(String),

    #[error("Reminder sink failure: {0}")]
    SinkFailure(String),

    #[error("Ledger unreadable: {0}")]
    LedgerCorrupt(String),

    #[error("No access token found: {0}")]
    MissingCredentials(String),

    #[error("osascript failed: {0}")]
    Script(String),

    #[error("osascript timed out after {0}s")]
    ScriptTimeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for meetsync operations.
pub type MeetSyncResult<T> = Result<T, MeetSyncError>;
