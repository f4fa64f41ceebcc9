//! Shared helpers for engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use syncdir_core::Directory;
use syncdir_engine::{
    CommitProcessingConfig, ExtensionsActivityMonitor, ModelChangingSyncerCommand,
    OrderedCommitSet, ProcessCommitResponseCommand, SyncResult, SyncSession, SyncerError,
};
use syncdir_protocol::ClientToServerResponse;
use syncdir_testkit::CommitFixture;

pub fn commit_set(fixture: &CommitFixture) -> OrderedCommitSet {
    let mut set = OrderedCommitSet::new();
    for (id, model_type) in &fixture.items {
        set.add_commit_item(id.clone(), *model_type);
    }
    set
}

pub fn session(dir: &Arc<Directory>, config: &CommitProcessingConfig) -> SyncSession {
    SyncSession::new(
        Arc::clone(dir),
        config.clone(),
        Arc::new(ExtensionsActivityMonitor::new()),
    )
}

/// Runs the command over `session`.
pub fn run(
    session: &mut SyncSession,
    fixture: &CommitFixture,
    response: &ClientToServerResponse,
) -> SyncResult<SyncerError> {
    let set = commit_set(fixture);
    let command = ProcessCommitResponseCommand::new(&set, &fixture.message, response);
    command.execute(session)
}

/// Runs the command with the default configuration.
pub fn process(
    dir: &Arc<Directory>,
    fixture: &CommitFixture,
    response: &ClientToServerResponse,
) -> (SyncerError, SyncSession) {
    let mut session = session(dir, &CommitProcessingConfig::default());
    let result = run(&mut session, fixture, response).expect("command must not abort");
    (result, session)
}
