//! Processing the server's answer to a commit.

use crate::command::ModelChangingSyncerCommand;
use crate::commit_set::OrderedCommitSet;
use crate::config::ModelSafeGroup;
use crate::error::{SyncError, SyncResult, SyncerError};
use crate::reconcile::{CommitReconciliation, SuccessfulCommit};
use crate::session::SyncSession;
use crate::syncer_util::{clear_syncing_bits, mark_deleted_children_synced};
use std::collections::BTreeSet;
use std::sync::Arc;
use syncdir_core::{EntryReader, Id, WriteTransaction, Writer};
use syncdir_protocol::{
    ClientToServerMessage, ClientToServerResponse, EntryResponse, ProtocolError, ResponseType,
    SyncEntity,
};
use tracing::{debug, error, warn};

/// Per-item outcomes of one group pass.
#[derive(Debug, Default)]
struct CommitTally {
    successes: usize,
    bookmark_successes: usize,
    conflicting: Vec<Id>,
    errors: usize,
    transient_errors: usize,
}

impl CommitTally {
    fn aggregate(&self, commit_count: usize) -> SyncResult<SyncerError> {
        if commit_count == self.successes {
            Ok(SyncerError::Ok)
        } else if self.errors > 0 {
            Ok(SyncerError::ServerReturnUnknownError)
        } else if self.transient_errors > 0 {
            Ok(SyncerError::ServerReturnTransientError)
        } else if !self.conflicting.is_empty() {
            // Retrying downloads the conflicting version first, which lets
            // the resolver run before the next commit.
            Ok(SyncerError::ServerReturnTransientError)
        } else {
            Err(SyncError::invariant_violation(format!(
                "inconsistent counts processing commit response: {commit_count} items, {} successes",
                self.successes
            )))
        }
    }
}

/// Applies a commit response to the directory.
///
/// Runs after a commit round trip. Every item in the batch leaves with its
/// syncing flag cleared; accepted items get their new version and
/// identifier, and items the server could not take are left unsynced for a
/// later batch.
///
/// # Example
///
/// ```rust,ignore
/// use syncdir_engine::{ModelChangingSyncerCommand, ProcessCommitResponseCommand};
///
/// let command = ProcessCommitResponseCommand::new(&commit_set, &message, &response);
/// let result = command.execute(&mut session)?;
/// if result.is_retryable() {
///     // schedule another cycle
/// }
/// ```
pub struct ProcessCommitResponseCommand<'a> {
    commit_set: &'a OrderedCommitSet,
    commit_message: &'a ClientToServerMessage,
    commit_response: &'a ClientToServerResponse,
}

impl<'a> ProcessCommitResponseCommand<'a> {
    /// Creates the command for one commit round trip.
    pub fn new(
        commit_set: &'a OrderedCommitSet,
        commit_message: &'a ClientToServerMessage,
        commit_response: &'a ClientToServerResponse,
    ) -> Self {
        Self {
            commit_set,
            commit_message,
            commit_response,
        }
    }

    fn process_commit_response(&self, session: &mut SyncSession) -> SyncResult<SyncerError> {
        let response = self
            .commit_response
            .commit
            .as_ref()
            .ok_or(ProtocolError::MissingField { field: "commit" })?;
        let message = self.commit_message.commit_body()?;
        let projection = session.commit_id_projection(self.commit_set);
        let bookmark_type = session.config().bookmark_type;
        let directory = Arc::clone(session.directory());

        let mut tally = CommitTally::default();
        directory.transaction(Writer::Syncer, |txn| {
            let mut deleted_folders = BTreeSet::new();
            for index in projection.iter() {
                let (entry_response, committed_entry, pre_commit_id) = (
                    response.entry_response.get(index),
                    message.entries.get(index),
                    self.commit_set.commit_id_at(index),
                );
                let (Some(entry_response), Some(committed_entry), Some(pre_commit_id)) =
                    (entry_response, committed_entry, pre_commit_id)
                else {
                    return Err(SyncError::invariant_violation(format!(
                        "commit item {index} missing from request or response"
                    )));
                };

                match process_single_commit_response(
                    txn,
                    entry_response,
                    committed_entry,
                    pre_commit_id,
                    &mut deleted_folders,
                )? {
                    ResponseType::InvalidMessage => tally.errors += 1,
                    ResponseType::Conflict => tally.conflicting.push(pre_commit_id.clone()),
                    ResponseType::Success => {
                        tally.successes += 1;
                        if self.commit_set.model_type_at(index) == Some(bookmark_type) {
                            tally.bookmark_successes += 1;
                        }
                    }
                    // Over quota is handled like a retry, which is transient.
                    ResponseType::OverQuota
                    | ResponseType::Retry
                    | ResponseType::TransientError => tally.transient_errors += 1,
                }
            }

            mark_deleted_children_synced(txn, &deleted_folders)?;
            Ok(())
        })?;

        let status = session.status_mut();
        for id in &tally.conflicting {
            status.mutable_conflict_progress().add_conflicting_item(id.clone());
        }
        status.increment_num_successful_commits_by(tally.successes);
        for _ in 0..tally.bookmark_successes {
            status.increment_num_successful_bookmark_commits();
        }

        debug!(
            items = projection.len(),
            successes = tally.successes,
            conflicts = tally.conflicting.len(),
            errors = tally.errors,
            transient = tally.transient_errors,
            "processed commit response"
        );
        tally.aggregate(projection.len())
    }
}

impl ModelChangingSyncerCommand for ProcessCommitResponseCommand<'_> {
    fn groups_to_change(&self, session: &SyncSession) -> BTreeSet<ModelSafeGroup> {
        self.commit_set.groups(&session.config().routing)
    }

    fn model_neutral_execute(&self, session: &mut SyncSession) -> SyncResult<SyncerError> {
        let directory = session.directory();
        let commit_ids = self.commit_set.all_commit_ids();

        let Some(response) = self.commit_response.commit.as_ref() else {
            warn!("commit response has no commit body");
            clear_syncing_bits(directory, commit_ids)?;
            return Ok(SyncerError::ServerResponseValidationFailed);
        };

        if response.entry_response.len() != self.commit_set.len() {
            error!(
                expected = self.commit_set.len(),
                got = response.entry_response.len(),
                "commit response has wrong number of entries"
            );
            for (i, entry) in response.entry_response.iter().enumerate() {
                error!(
                    index = i,
                    response_type = entry.response_type,
                    error_message = entry.error_message.as_deref().unwrap_or(""),
                    "response entry"
                );
            }
            clear_syncing_bits(directory, commit_ids)?;
            return Ok(SyncerError::ServerResponseValidationFailed);
        }

        let routing = &session.config().routing;
        if !self
            .commit_set
            .is_covered_by(routing, &self.groups_to_change(session))
        {
            return Err(SyncError::invariant_violation(
                "group projections do not cover every commit item exactly once",
            ));
        }
        Ok(SyncerError::Ok)
    }

    fn model_changing_execute(&self, session: &mut SyncSession) -> SyncResult<SyncerError> {
        let result = self.process_commit_response(session);

        // Only the pass that owns bookmarks reports extension activity.
        if session.has_bookmark_commit_activity(self.commit_set) {
            if session.status().syncer_status().num_successful_bookmark_commits == 0 {
                session
                    .extensions_monitor()
                    .put_records(session.extensions_activity());
            }
            session.mutable_extensions_activity().clear();
        }

        result
    }
}

fn log_server_error(entry_response: &EntryResponse) {
    match entry_response.error_message.as_deref() {
        Some(message) => warn!(error_message = message, "server error"),
        None => warn!("no detailed error message returned from server"),
    }
}

/// Classifies one response entry and applies it if it is a success.
///
/// The entry's syncing flag is cleared whatever the outcome.
fn process_single_commit_response(
    txn: &mut WriteTransaction<'_>,
    entry_response: &EntryResponse,
    committed_entry: &SyncEntity,
    pre_commit_id: &Id,
    deleted_folders: &mut BTreeSet<Id>,
) -> SyncResult<ResponseType> {
    let handle = txn.lookup(pre_commit_id).ok_or_else(|| {
        SyncError::invariant_violation(format!("committed entry {pre_commit_id} not found"))
    })?;
    let local_entry = txn.entry_mut(handle)?;
    let syncing_was_set = local_entry.is_syncing;
    local_entry.is_syncing = false;

    let Some(response) = entry_response.response_type() else {
        error!(
            id = %pre_commit_id,
            code = entry_response.response_type,
            "commit response has unknown response type"
        );
        return Ok(ResponseType::InvalidMessage);
    };

    match response {
        ResponseType::Success => {}
        ResponseType::TransientError => {
            debug!(id = %pre_commit_id, "transient error committing");
            log_server_error(entry_response);
            return Ok(response);
        }
        ResponseType::InvalidMessage => {
            error!(id = %pre_commit_id, "error committing");
            log_server_error(entry_response);
            return Ok(response);
        }
        ResponseType::Conflict => {
            debug!(id = %pre_commit_id, "conflict committing");
            return Ok(response);
        }
        ResponseType::Retry => {
            debug!(id = %pre_commit_id, "retry committing");
            return Ok(response);
        }
        ResponseType::OverQuota => {
            warn!(id = %pre_commit_id, "over quota committing");
            return Ok(response);
        }
    }

    let Some(id_string) = entry_response.id_string.as_deref() else {
        error!(id = %pre_commit_id, "commit response has no id");
        return Ok(ResponseType::InvalidMessage);
    };
    let new_id = Id::create_from_server_id(id_string);

    if new_id != *pre_commit_id && txn.lookup(&new_id).is_some() {
        error!(
            id = %pre_commit_id,
            duplicate = %new_id,
            "got duplicate id when committing, treating as an error"
        );
        return Ok(ResponseType::InvalidMessage);
    }

    if entry_response.version() == 0 {
        warn!(id = %pre_commit_id, "server returned a zero version on a commit response");
    }

    let commit = SuccessfulCommit::new(committed_entry, entry_response, pre_commit_id, new_id);
    match commit.apply(txn, handle, syncing_was_set, deleted_folders)? {
        CommitReconciliation::Applied => Ok(ResponseType::Success),
        CommitReconciliation::BadVersion | CommitReconciliation::IdClash => {
            Ok(ResponseType::InvalidMessage)
        }
    }
}
