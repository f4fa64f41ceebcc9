//! Read transactions.

use crate::directory::Store;
use crate::entry::{EntryKernel, Id};
use crate::transaction::EntryReader;
use crate::types::{MetaHandle, TransactionId};
use parking_lot::RwLockReadGuard;

/// A read-only view of the committed directory.
///
/// Holds a shared lock for its lifetime, so the view cannot change under it.
pub struct ReadTransaction<'a> {
    id: TransactionId,
    store: RwLockReadGuard<'a, Store>,
}

impl<'a> ReadTransaction<'a> {
    pub(crate) fn new(id: TransactionId, store: RwLockReadGuard<'a, Store>) -> Self {
        Self { id, store }
    }

    /// Returns the transaction ID.
    #[must_use]
    pub fn id(&self) -> TransactionId {
        self.id
    }
}

impl EntryReader for ReadTransaction<'_> {
    fn lookup(&self, id: &Id) -> Option<MetaHandle> {
        self.store.ids.get(id).copied()
    }

    fn entry(&self, handle: MetaHandle) -> Option<&EntryKernel> {
        self.store.entries.get(handle.slot())
    }

    fn handle_count(&self) -> usize {
        self.store.entries.len()
    }
}
