//! Write transactions.

use crate::directory::Store;
use crate::entry::{EntryKernel, Id};
use crate::error::{CoreError, CoreResult};
use crate::transaction::EntryReader;
use crate::types::{MetaHandle, TransactionId, Writer};
use parking_lot::RwLockUpgradableReadGuard;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

/// A single-writer transaction over the directory.
///
/// Changes are staged in an overlay and only reach the committed store
/// when [`commit`](Self::commit) is called. Dropping or aborting the
/// transaction discards the overlay.
///
/// The transaction holds an upgradable lock, so concurrent readers keep
/// working until commit, while a second writer waits.
pub struct WriteTransaction<'a> {
    id: TransactionId,
    writer: Writer,
    base: RwLockUpgradableReadGuard<'a, Store>,
    /// Copy-on-write entries, keyed by handle.
    dirty: BTreeMap<MetaHandle, EntryKernel>,
    /// Identifier index changes; `None` removes the mapping.
    id_index: HashMap<Id, Option<MetaHandle>>,
    created: usize,
}

impl<'a> WriteTransaction<'a> {
    pub(crate) fn new(
        id: TransactionId,
        writer: Writer,
        base: RwLockUpgradableReadGuard<'a, Store>,
    ) -> Self {
        tracing::trace!(txid = %id, ?writer, "begin write transaction");
        Self {
            id,
            writer,
            base,
            dirty: BTreeMap::new(),
            id_index: HashMap::new(),
            created: 0,
        }
    }

    /// Returns the transaction ID.
    #[must_use]
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Returns who opened the transaction.
    #[must_use]
    pub fn writer(&self) -> Writer {
        self.writer
    }

    /// Returns a mutable view of the entry at `handle`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHandle` if no entry lives at `handle`.
    pub fn entry_mut(&mut self, handle: MetaHandle) -> CoreResult<&mut EntryKernel> {
        match self.dirty.entry(handle) {
            Entry::Occupied(slot) => Ok(slot.into_mut()),
            Entry::Vacant(slot) => {
                let kernel = self
                    .base
                    .entries
                    .get(handle.slot())
                    .cloned()
                    .ok_or(CoreError::InvalidHandle { handle })?;
                Ok(slot.insert(kernel))
            }
        }
    }

    /// Returns a mutable view of the entry with identifier `id`.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if no entry has that identifier.
    pub fn get_by_id_mut(&mut self, id: &Id) -> CoreResult<&mut EntryKernel> {
        let handle = self
            .lookup(id)
            .ok_or_else(|| CoreError::entry_not_found(id))?;
        self.entry_mut(handle)
    }

    /// Inserts a new entry and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns `IdClash` if the identifier is already in use.
    pub fn create_entry(&mut self, kernel: EntryKernel) -> CoreResult<MetaHandle> {
        if self.lookup(kernel.id()).is_some() {
            return Err(CoreError::id_clash(kernel.id()));
        }

        let handle = MetaHandle::new(self.handle_count());
        self.created += 1;
        self.id_index.insert(kernel.id().clone(), Some(handle));
        self.dirty.insert(handle, kernel);
        Ok(handle)
    }

    /// Renames the entry at `handle` to `new_id`.
    ///
    /// Every entry whose parent (visible or server-confirmed) was the old
    /// identifier is re-parented to `new_id`. Returns the number of
    /// visible children moved.
    ///
    /// # Errors
    ///
    /// Returns `IdClash` if `new_id` already names another entry, and
    /// `InvalidHandle` if `handle` is empty.
    pub fn change_id_and_update_children(
        &mut self,
        handle: MetaHandle,
        new_id: Id,
    ) -> CoreResult<usize> {
        let old_id = self
            .entry(handle)
            .ok_or(CoreError::InvalidHandle { handle })?
            .id()
            .clone();
        if old_id == new_id {
            return Ok(0);
        }
        if self.lookup(&new_id).is_some() {
            return Err(CoreError::id_clash(&new_id));
        }

        self.entry_mut(handle)?.id = new_id.clone();
        self.id_index.insert(old_id.clone(), None);
        self.id_index.insert(new_id.clone(), Some(handle));

        let affected: Vec<MetaHandle> = self
            .handles()
            .into_iter()
            .filter(|&h| {
                self.entry(h).is_some_and(|e| {
                    e.parent_id == old_id || e.server_parent_id.as_ref() == Some(&old_id)
                })
            })
            .collect();

        let mut moved = 0;
        for child in affected {
            let entry = self.entry_mut(child)?;
            if entry.parent_id == old_id {
                entry.parent_id = new_id.clone();
                moved += 1;
            }
            if entry.server_parent_id.as_ref() == Some(&old_id) {
                entry.server_parent_id = Some(new_id.clone());
            }
        }

        tracing::debug!(
            txid = %self.id,
            old = %old_id,
            new = %new_id,
            children = moved,
            "changed entry id"
        );
        Ok(moved)
    }

    /// Returns the number of entries touched so far.
    #[must_use]
    pub fn pending_changes(&self) -> usize {
        self.dirty.len()
    }

    /// Applies every staged change to the directory.
    ///
    /// Returns the number of entries written.
    pub fn commit(self) -> usize {
        let Self {
            id,
            base,
            dirty,
            id_index,
            ..
        } = self;

        let mut store = RwLockUpgradableReadGuard::upgrade(base);
        let written = dirty.len();
        // Ascending handle order: new slots are always appended in sequence.
        for (handle, kernel) in dirty {
            match store.entries.get_mut(handle.slot()) {
                Some(existing) => *existing = kernel,
                None => store.entries.push(kernel),
            }
        }
        for (entry_id, handle) in id_index {
            match handle {
                Some(handle) => {
                    store.ids.insert(entry_id, handle);
                }
                None => {
                    store.ids.remove(&entry_id);
                }
            }
        }

        tracing::debug!(txid = %id, written, "committed write transaction");
        written
    }

    /// Discards every staged change.
    pub fn abort(self) {
        tracing::debug!(
            txid = %self.id,
            discarded = self.dirty.len(),
            "aborted write transaction"
        );
    }
}

impl EntryReader for WriteTransaction<'_> {
    fn lookup(&self, id: &Id) -> Option<MetaHandle> {
        match self.id_index.get(id) {
            Some(staged) => *staged,
            None => self.base.ids.get(id).copied(),
        }
    }

    fn entry(&self, handle: MetaHandle) -> Option<&EntryKernel> {
        self.dirty
            .get(&handle)
            .or_else(|| self.base.entries.get(handle.slot()))
    }

    fn handle_count(&self) -> usize {
        self.base.entries.len() + self.created
    }
}
