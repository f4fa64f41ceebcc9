//! Merging an accepted commit back into its local entry.

use crate::error::SyncResult;
use std::collections::BTreeSet;
use syncdir_core::{EntryKernel, EntryReader, Id, MetaHandle, WriteTransaction};
use syncdir_protocol::{EntryResponse, SyncEntity};
use tracing::{debug, error};

/// How far a successful commit got applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommitReconciliation {
    /// Every update was applied.
    Applied,
    /// The server reported an unacceptable version; nothing was changed.
    BadVersion,
    /// The server assigned an identifier already in use; nothing was
    /// changed.
    IdClash,
}

/// A commit the server accepted, with everything needed to apply it.
pub(crate) struct SuccessfulCommit<'r> {
    committed_entry: &'r SyncEntity,
    entry_response: &'r EntryResponse,
    pre_commit_id: &'r Id,
    new_id: Id,
}

impl<'r> SuccessfulCommit<'r> {
    pub(crate) fn new(
        committed_entry: &'r SyncEntity,
        entry_response: &'r EntryResponse,
        pre_commit_id: &'r Id,
        new_id: Id,
    ) -> Self {
        Self {
            committed_entry,
            entry_response,
            pre_commit_id,
            new_id,
        }
    }

    /// Name the item carries after the commit: the server's if it sent
    /// one, otherwise the name that was committed.
    pub(crate) fn resulting_post_commit_name(&self) -> &'r str {
        let response_name = self.entry_response.resolved_name();
        if response_name.is_empty() {
            self.committed_entry.resolved_name()
        } else {
            response_name
        }
    }

    /// Applies the commit to the entry at `handle`.
    ///
    /// `syncing_was_set` is whether the entry was still marked syncing when
    /// the response arrived; if not, a local edit raced the commit and the
    /// visible fields are left alone.
    pub(crate) fn apply(
        &self,
        txn: &mut WriteTransaction<'_>,
        handle: MetaHandle,
        syncing_was_set: bool,
        deleted_folders: &mut BTreeSet<Id>,
    ) -> SyncResult<CommitReconciliation> {
        if self.id_clashes(txn) {
            return Ok(CommitReconciliation::IdClash);
        }

        if !self.update_version(txn.entry_mut(handle)?) {
            return Ok(CommitReconciliation::BadVersion);
        }

        self.change_id(txn, handle)?;

        let local_entry = txn.entry_mut(handle)?;
        self.update_server_fields(local_entry);

        if syncing_was_set {
            self.override_client_fields(local_entry);
            local_entry.is_unsynced = false;
        }

        if local_entry.is_dir && local_entry.is_del {
            deleted_folders.insert(local_entry.id().clone());
        }
        Ok(CommitReconciliation::Applied)
    }

    /// Sets base and server version. Returns false if the reported version
    /// is not acceptable, in which case the entry is untouched.
    pub(crate) fn update_version(&self, local_entry: &mut EntryKernel) -> bool {
        let old_version = local_entry.base_version;
        let mut new_version = self.entry_response.version();

        let bad_commit_version = if self.committed_entry.deleted
            && local_entry.has_unique_client_tag()
        {
            // Undeletion must look like a fresh creation to the server.
            new_version = 0;
            false
        } else if !self.pre_commit_id.server_knows() {
            new_version == 0
        } else {
            old_version > new_version
        };

        if bad_commit_version {
            error!(
                id = %local_entry.id(),
                new_id = %self.new_id,
                old_version,
                new_version,
                "bad version in commit response"
            );
            return false;
        }

        local_entry.base_version = new_version;
        local_entry.server_version = new_version;
        debug!(id = %local_entry.id(), version = new_version, "commit changed base version");
        true
    }

    /// Returns true if the new identifier already names another entry.
    pub(crate) fn id_clashes(&self, txn: &WriteTransaction<'_>) -> bool {
        if self.new_id == *self.pre_commit_id || txn.lookup(&self.new_id).is_none() {
            return false;
        }
        error!(id = %self.new_id, "id clash during commit");
        true
    }

    /// Moves the entry to its server-assigned identifier.
    ///
    /// # Errors
    ///
    /// Fails with an id clash if the new identifier is taken; check
    /// [`id_clashes`](Self::id_clashes) first.
    pub(crate) fn change_id(
        &self,
        txn: &mut WriteTransaction<'_>,
        handle: MetaHandle,
    ) -> SyncResult<()> {
        if self.new_id == *self.pre_commit_id {
            return Ok(());
        }

        if self.pre_commit_id.server_knows() {
            debug!(
                old = %self.pre_commit_id,
                new = %self.new_id,
                "server changed the id of a known entry"
            );
        }
        txn.change_id_and_update_children(handle, self.new_id.clone())?;
        Ok(())
    }

    /// Records the server's view of the committed item.
    pub(crate) fn update_server_fields(&self, local_entry: &mut EntryKernel) {
        let committed = self.committed_entry;
        local_entry.server_is_del = committed.deleted;
        if committed.deleted {
            return;
        }

        local_entry.server_is_dir = committed.folder;
        local_entry.server_specifics = committed.specifics.clone();
        local_entry.server_mtime = committed.mtime;
        local_entry.server_ctime = committed.ctime;
        local_entry.server_position_in_parent =
            self.entry_response.position_in_parent.unwrap_or_default();
        local_entry.server_parent_id = Some(local_entry.parent_id.clone());
        local_entry.server_name = self.resulting_post_commit_name().to_string();

        if local_entry.is_unapplied_update {
            // The update info was just overwritten.
            local_entry.is_unapplied_update = false;
        }
    }

    /// Applies the server's canonicalization of name and position.
    pub(crate) fn override_client_fields(&self, local_entry: &mut EntryKernel) {
        if self.committed_entry.deleted {
            return;
        }

        let server_name = self.resulting_post_commit_name();
        if !server_name.is_empty() && local_entry.name != server_name {
            debug!(
                old = %local_entry.name,
                new = %server_name,
                "server changed name during commit"
            );
            local_entry.name = server_name.to_string();
        }

        if let Some(position) = self.entry_response.position_in_parent {
            local_entry.position_in_parent = position;
        }
    }
}
