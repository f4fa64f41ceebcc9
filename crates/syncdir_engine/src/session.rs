//! Per-cycle session state shared between syncer commands.

use crate::commit_set::{OrderedCommitSet, Projection};
use crate::config::{CommitProcessingConfig, ModelSafeGroup, ModelSafeRoutingInfo};
use crate::extensions_activity::{ExtensionsActivityMonitor, ExtensionsActivityRecords};
use std::collections::BTreeSet;
use std::sync::Arc;
use syncdir_core::{Directory, Id};

/// Identifiers of items in unresolved server-side conflict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictProgress {
    conflicting_ids: BTreeSet<Id>,
}

impl ConflictProgress {
    /// Records `id` as conflicting. Returns false if it already was.
    pub fn add_conflicting_item(&mut self, id: Id) -> bool {
        self.conflicting_ids.insert(id)
    }

    /// Forgets `id`. Returns false if it was not recorded.
    pub fn erase_conflicting_item(&mut self, id: &Id) -> bool {
        self.conflicting_ids.remove(id)
    }

    /// Returns true if `id` is recorded as conflicting.
    pub fn has_conflicting_item(&self, id: &Id) -> bool {
        self.conflicting_ids.contains(id)
    }

    /// Returns the number of conflicting items.
    pub fn conflicting_items_size(&self) -> usize {
        self.conflicting_ids.len()
    }

    /// Iterates over the conflicting identifiers.
    pub fn conflicting_items(&self) -> impl Iterator<Item = &Id> {
        self.conflicting_ids.iter()
    }
}

/// Commit counters for the current cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncerStatus {
    /// Items the server accepted.
    pub num_successful_commits: usize,
    /// Accepted items of the bookmark type.
    pub num_successful_bookmark_commits: usize,
}

/// Collects the observable results of a sync cycle.
#[derive(Debug, Clone, Default)]
pub struct StatusController {
    conflict_progress: ConflictProgress,
    syncer_status: SyncerStatus,
    group_restriction: Option<ModelSafeGroup>,
}

impl StatusController {
    /// Creates an empty status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the conflict record.
    pub fn conflict_progress(&self) -> &ConflictProgress {
        &self.conflict_progress
    }

    /// Returns the conflict record for writing.
    pub fn mutable_conflict_progress(&mut self) -> &mut ConflictProgress {
        &mut self.conflict_progress
    }

    /// Returns the commit counters.
    pub fn syncer_status(&self) -> SyncerStatus {
        self.syncer_status
    }

    /// Adds `count` to the successful commit counter.
    pub fn increment_num_successful_commits_by(&mut self, count: usize) {
        self.syncer_status.num_successful_commits += count;
    }

    /// Adds one to the successful bookmark commit counter.
    pub fn increment_num_successful_bookmark_commits(&mut self) {
        self.syncer_status.num_successful_bookmark_commits += 1;
    }

    /// Returns the group the current pass is restricted to.
    pub fn group_restriction(&self) -> Option<ModelSafeGroup> {
        self.group_restriction
    }

    /// Returns the batch indices `routing` makes visible to the current pass.
    ///
    /// Without a restriction every index of the batch is visible.
    pub fn commit_id_projection(
        &self,
        commit_set: &OrderedCommitSet,
        routing: &ModelSafeRoutingInfo,
    ) -> Projection {
        match self.group_restriction {
            Some(group) => commit_set.projection(routing, group),
            None => Projection::all(commit_set.len()),
        }
    }
}

/// State of one sync cycle.
pub struct SyncSession {
    directory: Arc<Directory>,
    config: CommitProcessingConfig,
    status: StatusController,
    extensions_activity: ExtensionsActivityRecords,
    extensions_monitor: Arc<ExtensionsActivityMonitor>,
}

impl SyncSession {
    /// Creates a session over `directory`.
    pub fn new(
        directory: Arc<Directory>,
        config: CommitProcessingConfig,
        extensions_monitor: Arc<ExtensionsActivityMonitor>,
    ) -> Self {
        Self {
            directory,
            config,
            status: StatusController::new(),
            extensions_activity: ExtensionsActivityRecords::new(),
            extensions_monitor,
        }
    }

    /// Returns the directory being synced.
    pub fn directory(&self) -> &Arc<Directory> {
        &self.directory
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CommitProcessingConfig {
        &self.config
    }

    /// Returns the status.
    pub fn status(&self) -> &StatusController {
        &self.status
    }

    /// Returns the status for writing.
    pub fn status_mut(&mut self) -> &mut StatusController {
        &mut self.status
    }

    /// Returns the extension activity attached to the current commit.
    pub fn extensions_activity(&self) -> &ExtensionsActivityRecords {
        &self.extensions_activity
    }

    /// Returns the extension activity attached to the current commit, for writing.
    pub fn mutable_extensions_activity(&mut self) -> &mut ExtensionsActivityRecords {
        &mut self.extensions_activity
    }

    /// Returns the shared activity monitor.
    pub fn extensions_monitor(&self) -> &Arc<ExtensionsActivityMonitor> {
        &self.extensions_monitor
    }

    /// Returns the batch indices visible to the current pass under the
    /// session's routing.
    pub fn commit_id_projection(&self, commit_set: &OrderedCommitSet) -> Projection {
        self.status.commit_id_projection(commit_set, &self.config.routing)
    }

    /// Moves the monitor's records into this session for the next commit.
    pub fn snapshot_extensions_activity(&mut self) {
        let records = self.extensions_monitor.get_and_clear_records();
        for (extension_id, record) in records {
            self.extensions_activity
                .entry(extension_id)
                .and_modify(|r| r.bookmark_write_count += record.bookmark_write_count)
                .or_insert(record);
        }
    }

    /// Returns true if the current pass may touch bookmarks and the batch
    /// carries at least one.
    pub fn has_bookmark_commit_activity(&self, commit_set: &OrderedCommitSet) -> bool {
        let bookmark_type = self.config.bookmark_type;
        let group_includes_bookmarks = self
            .status
            .group_restriction()
            .map_or(true, |group| group == self.config.routing.group_for(bookmark_type));
        group_includes_bookmarks && commit_set.has_bookmark_commit_id(bookmark_type)
    }

    /// Runs `f` with the status restricted to `group`.
    pub fn with_group_restriction<F, T>(&mut self, group: ModelSafeGroup, f: F) -> T
    where
        F: FnOnce(&mut Self) -> T,
    {
        let previous = self.status.group_restriction.replace(group);
        let result = f(self);
        self.status.group_restriction = previous;
        result
    }
}
