//! Directory helpers shared by syncer commands.

use crate::error::SyncResult;
use std::collections::BTreeSet;
use syncdir_core::{Directory, EntryReader, Id, WriteTransaction, Writer};
use tracing::{debug, warn};

/// Settles deleted entries whose deleted ancestor folder was just committed.
///
/// The server deletes a folder's contents along with the folder, so an
/// unsynced deleted entry below a folder in `deleted_folders` (through a
/// chain of deleted parents) no longer has a commit in flight. Its syncing
/// flag is cleared; its unsynced flag is left as it is.
///
/// Returns the number of entries touched.
pub fn mark_deleted_children_synced(
    txn: &mut WriteTransaction<'_>,
    deleted_folders: &BTreeSet<Id>,
) -> SyncResult<usize> {
    if deleted_folders.is_empty() {
        return Ok(0);
    }

    let max_depth = txn.handle_count();
    let mut marked = 0;
    for handle in txn.unsynced_handles() {
        let Some(entry) = txn.entry(handle) else {
            continue;
        };
        if !entry.is_del {
            continue;
        }

        let mut parent_id = entry.parent_id.clone();
        let mut covered = false;
        for _ in 0..max_depth {
            if parent_id.is_root() {
                break;
            }
            if deleted_folders.contains(&parent_id) {
                covered = true;
                break;
            }
            match txn.get_by_id(&parent_id) {
                Some(parent) if parent.is_del => parent_id = parent.parent_id.clone(),
                _ => break,
            }
        }

        if covered {
            txn.entry_mut(handle)?.is_syncing = false;
            marked += 1;
        }
    }

    if marked > 0 {
        debug!(marked, "settled deleted children of committed folders");
    }
    Ok(marked)
}

/// Clears the syncing flag of every listed entry in one transaction.
///
/// Entries that no longer exist are logged and skipped.
pub fn clear_syncing_bits(directory: &Directory, commit_ids: &[Id]) -> SyncResult<()> {
    directory.transaction(Writer::Syncer, |txn| {
        for id in commit_ids {
            match txn.lookup(id) {
                Some(handle) => txn.entry_mut(handle)?.is_syncing = false,
                None => warn!(id = %id, "committed entry disappeared"),
            }
        }
        Ok(())
    })
}
