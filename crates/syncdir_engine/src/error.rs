//! Error types for the sync engine.

use syncdir_core::CoreError;
use syncdir_protocol::ProtocolError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that abort a command.
///
/// Per-item failures reported by the server are not errors; they are
/// tallied into a [`SyncerError`]. A `SyncError` means the command could
/// not run to completion and none of its changes were kept.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Store error during reconciliation.
    #[error("store error: {0}")]
    Store(#[from] CoreError),

    /// Message could not be read.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The directory, the commit set and the response disagree in a way
    /// that cannot happen without corruption.
    #[error("invariant violation: {message}")]
    InvariantViolation {
        /// What was violated.
        message: String,
    },
}

impl SyncError {
    /// Creates an invariant violation error.
    pub fn invariant_violation(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }
}

/// Outcome of a syncer command, consumed by the cycle scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncerError {
    /// The command succeeded.
    Ok,
    /// The server response did not match the request.
    ServerResponseValidationFailed,
    /// The server rejected at least one item as invalid.
    ServerReturnUnknownError,
    /// At least one item failed transiently or is in conflict.
    ServerReturnTransientError,
}

impl SyncerError {
    /// Returns true for `Ok`.
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    /// Returns true if the scheduler may retry the cycle.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::ServerReturnTransientError | Self::ServerResponseValidationFailed
        )
    }

    /// Returns a stable name for logging.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "SYNCER_OK",
            Self::ServerResponseValidationFailed => "SERVER_RESPONSE_VALIDATION_FAILED",
            Self::ServerReturnUnknownError => "SERVER_RETURN_UNKNOWN_ERROR",
            Self::ServerReturnTransientError => "SERVER_RETURN_TRANSIENT_ERROR",
        }
    }
}

impl std::fmt::Display for SyncerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
