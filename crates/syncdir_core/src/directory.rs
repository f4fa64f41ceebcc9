//! The directory: an identifier-indexed arena of entries.

use crate::entry::{EntryKernel, Id};
use crate::transaction::{EntryReader, ReadTransaction, WriteTransaction};
use crate::types::{MetaHandle, TransactionId, Writer};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Committed directory contents.
///
/// Entries live in an arena indexed by `MetaHandle`; `ids` maps each
/// identifier to its slot. Remapping an identifier is an index update, not
/// a move.
#[derive(Debug, Default)]
pub(crate) struct Store {
    pub(crate) entries: Vec<EntryKernel>,
    pub(crate) ids: HashMap<Id, MetaHandle>,
}

impl Store {
    fn with_root() -> Self {
        let mut root = EntryKernel::new(Id::root(), Id::root(), "").folder();
        root.server_is_dir = true;

        let mut store = Self::default();
        store.ids.insert(root.id.clone(), MetaHandle::new(0));
        store.entries.push(root);
        store
    }
}

/// The hierarchical item store.
///
/// `Directory` provides:
/// - Identifier lookup over an arena of entries
/// - Snapshot reads through `ReadTransaction`
/// - Single-writer, all-or-nothing mutation through `WriteTransaction`
///
/// A freshly created directory holds only the root entry.
///
/// # Example
///
/// ```rust,ignore
/// use syncdir_core::{Directory, EntryKernel, Id, Writer};
///
/// let dir = Directory::new("profile");
/// dir.transaction(Writer::Local, |txn| {
///     txn.create_entry(EntryKernel::new(Id::new_client_id(), Id::root(), "Folder").folder())?;
///     Ok::<_, syncdir_core::CoreError>(())
/// })?;
/// ```
#[derive(Debug)]
pub struct Directory {
    name: String,
    store: RwLock<Store>,
    next_txid: AtomicU64,
}

impl Directory {
    /// Creates a directory containing only the root entry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store: RwLock::new(Store::with_root()),
            next_txid: AtomicU64::new(1),
        }
    }

    /// Returns the directory name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Begins a read transaction.
    ///
    /// Blocks only while a write transaction is committing.
    pub fn read(&self) -> ReadTransaction<'_> {
        ReadTransaction::new(self.next_txid(), self.store.read())
    }

    /// Begins a write transaction.
    ///
    /// Only one write transaction can exist at a time; this blocks until any
    /// other writer has committed or been dropped. Readers keep seeing the
    /// committed state until this transaction commits.
    pub fn begin_write(&self, writer: Writer) -> WriteTransaction<'_> {
        WriteTransaction::new(self.next_txid(), writer, self.store.upgradable_read())
    }

    /// Executes a function within a write transaction.
    ///
    /// If the function returns `Ok`, the transaction is committed.
    /// If it returns `Err`, every change it staged is discarded.
    pub fn transaction<F, T, E>(&self, writer: Writer, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut WriteTransaction<'_>) -> Result<T, E>,
    {
        let mut txn = self.begin_write(writer);
        match f(&mut txn) {
            Ok(value) => {
                txn.commit();
                Ok(value)
            }
            Err(e) => {
                txn.abort();
                Err(e)
            }
        }
    }

    /// Returns a copy of the committed entry with the given identifier.
    pub fn get_by_id(&self, id: &Id) -> Option<EntryKernel> {
        self.read().get_by_id(id).cloned()
    }

    /// Returns the number of entries, including the root.
    pub fn entry_count(&self) -> usize {
        self.store.read().entries.len()
    }

    fn next_txid(&self) -> TransactionId {
        TransactionId::new(self.next_txid.fetch_add(1, Ordering::SeqCst))
    }
}
