//! Transactions over the directory.
//!
//! The directory provides all-or-nothing transactions:
//! - **Atomicity**: a write transaction's changes apply together on commit
//! - **Isolation**: readers never observe a half-applied write transaction
//! - **Single writer**: at most one write transaction is open at a time

mod read;
mod write;

pub use read::ReadTransaction;
pub use write::WriteTransaction;

use crate::entry::{EntryKernel, Id};
use crate::types::MetaHandle;

/// Read access shared by read and write transactions.
pub trait EntryReader {
    /// Resolves an identifier to its handle.
    fn lookup(&self, id: &Id) -> Option<MetaHandle>;

    /// Returns the entry stored at a handle.
    fn entry(&self, handle: MetaHandle) -> Option<&EntryKernel>;

    /// Returns the number of arena slots.
    fn handle_count(&self) -> usize;

    /// Returns the entry with the given identifier.
    fn get_by_id(&self, id: &Id) -> Option<&EntryKernel> {
        self.lookup(id).and_then(|handle| self.entry(handle))
    }

    /// Returns every handle in the arena.
    fn handles(&self) -> Vec<MetaHandle> {
        (0..self.handle_count()).map(MetaHandle::new).collect()
    }

    /// Returns the children of `parent_id` in sibling order.
    fn children_of(&self, parent_id: &Id) -> Vec<MetaHandle> {
        let mut children: Vec<(i64, MetaHandle)> = self
            .handles()
            .into_iter()
            .filter_map(|handle| {
                let entry = self.entry(handle)?;
                (entry.parent_id == *parent_id && entry.id() != parent_id)
                    .then_some((entry.position_in_parent, handle))
            })
            .collect();
        children.sort();
        children.into_iter().map(|(_, handle)| handle).collect()
    }

    /// Returns the handles of entries with unconfirmed local edits.
    fn unsynced_handles(&self) -> Vec<MetaHandle> {
        self.handles()
            .into_iter()
            .filter(|&handle| self.entry(handle).is_some_and(|e| e.is_unsynced))
            .collect()
    }
}
