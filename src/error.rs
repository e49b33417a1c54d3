//! Error types for the synchronization core.
//!
//! Producer and check failures are not represented here: they stay plain
//! `String` messages, the same shape backend commands return them in, and are
//! converted into state or callback signals where they happen.

use thiserror::Error;

/// Result type alias for fallible setup operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors raised while wiring up fetchers and monitors.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No Tokio runtime is reachable from the calling context.
    #[error("No Tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    /// A monitor was started with a zero polling period.
    #[error("Polling period for {monitor} must be greater than zero")]
    InvalidPeriod { monitor: &'static str },

    /// Polling configuration failed validation.
    #[error("Invalid polling config: {reason}")]
    InvalidConfig { reason: String },

    /// Polling configuration could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// Get a stable error code for support purposes.
    pub fn error_code(&self) -> &'static str {
        match self {
            SyncError::NoRuntime(_) => "SYNC-001",
            SyncError::InvalidPeriod { .. } => "SYNC-010",
            SyncError::InvalidConfig { .. } => "SYNC-020",
            SyncError::Json(_) => "SYNC-021",
        }
    }
}
