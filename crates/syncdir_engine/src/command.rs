//! Syncer commands that mutate the directory one model-safe group at a time.

use crate::config::ModelSafeGroup;
use crate::error::{SyncResult, SyncerError};
use crate::session::SyncSession;
use std::collections::BTreeSet;
use tracing::debug;

/// A syncer command split into a model-neutral step and a per-group step.
///
/// [`execute`](Self::execute) runs the model-neutral step once; if it
/// succeeds, the model-changing step runs once per group returned by
/// [`groups_to_change`](Self::groups_to_change), with the session's status
/// restricted to that group. The first non-`Ok` group result is returned.
pub trait ModelChangingSyncerCommand {
    /// Returns the groups whose entries this command will change.
    fn groups_to_change(&self, session: &SyncSession) -> BTreeSet<ModelSafeGroup>;

    /// Work that does not touch model data. Runs once, before any group.
    fn model_neutral_execute(&self, _session: &mut SyncSession) -> SyncResult<SyncerError> {
        Ok(SyncerError::Ok)
    }

    /// Work for the group the session is currently restricted to.
    fn model_changing_execute(&self, session: &mut SyncSession) -> SyncResult<SyncerError>;

    /// Runs the whole command.
    ///
    /// # Errors
    ///
    /// Returns the first error from either step. Groups already processed
    /// keep their committed changes.
    fn execute(&self, session: &mut SyncSession) -> SyncResult<SyncerError> {
        let neutral = self.model_neutral_execute(session)?;
        if !neutral.is_ok() {
            return Ok(neutral);
        }

        let mut result = SyncerError::Ok;
        for group in self.groups_to_change(session) {
            let group_result =
                session.with_group_restriction(group, |s| self.model_changing_execute(s))?;
            debug!(%group, result = %group_result, "model changing pass finished");
            if result.is_ok() {
                result = group_result;
            }
        }
        Ok(result)
    }
}
