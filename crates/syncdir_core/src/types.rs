//! Core type definitions for the item store.

use std::fmt;

/// Unique identifier for a transaction.
///
/// Transaction IDs are monotonically increasing and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionId(pub u64);

impl TransactionId {
    /// Creates a new transaction ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn:{}", self.0)
    }
}

/// Stable local handle of an entry.
///
/// A handle is the entry's slot in the directory arena. Unlike the entry's
/// `Id`, it never changes, so it survives identifier remapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetaHandle(pub usize);

impl MetaHandle {
    /// Creates a handle from an arena slot.
    #[must_use]
    pub const fn new(slot: usize) -> Self {
        Self(slot)
    }

    /// Returns the arena slot.
    #[must_use]
    pub const fn slot(self) -> usize {
        self.0
    }
}

impl fmt::Display for MetaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle:{}", self.0)
    }
}

/// Who opened a write transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Writer {
    /// The sync engine.
    Syncer,
    /// Local model changes.
    Local,
    /// Test setup.
    Unittest,
}
