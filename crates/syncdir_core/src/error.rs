//! Error types for the item store.

use crate::entry::Id;
use crate::types::MetaHandle;
use thiserror::Error;

/// Result type for store operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// No entry carries the requested identifier.
    #[error("entry not found: {id}")]
    EntryNotFound {
        /// The identifier that was looked up.
        id: Id,
    },

    /// No entry lives at the requested handle.
    #[error("no entry at handle {handle}")]
    InvalidHandle {
        /// The handle that was dereferenced.
        handle: MetaHandle,
    },

    /// Another entry already uses the identifier.
    #[error("identifier {id} is already in use")]
    IdClash {
        /// The clashing identifier.
        id: Id,
    },

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates an entry not found error.
    pub fn entry_not_found(id: &Id) -> Self {
        Self::EntryNotFound { id: id.clone() }
    }

    /// Creates an identifier clash error.
    pub fn id_clash(id: &Id) -> Self {
        Self::IdClash { id: id.clone() }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }
}
