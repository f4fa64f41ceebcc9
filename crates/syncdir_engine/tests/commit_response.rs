//! End-to-end tests for commit response processing.

mod common;

use common::{commit_set, process, run, session};
use std::sync::Arc;
use syncdir_engine::{
    CommitProcessingConfig, ModelChangingSyncerCommand, ModelSafeGroup, ModelSafeRoutingInfo,
    OrderedCommitSet, ProcessCommitResponseCommand, SyncerError,
};
use syncdir_protocol::{ClientToServerMessage, ClientToServerResponse, ModelType, ResponseType};
use syncdir_testkit::prelude::*;

#[test]
fn new_folder_and_child_get_server_ids() {
    init_test_logging();
    let folder = client_folder(&Id::root(), "T1");
    let child = client_item(folder.id(), "T2");
    let dir = DirectoryBuilder::new()
        .entry(folder.clone())
        .entry(child.clone())
        .build();
    let commit = CommitBuilder::new(&dir)
        .item(folder.id(), ModelType::Bookmarks)
        .item(child.id(), ModelType::Bookmarks)
        .build();
    let response = ResponseBuilder::new().success("S1", 1).success("S2", 1).build();

    let (result, session) = process(&dir, &commit, &response);

    assert_eq!(result, SyncerError::Ok);
    let s1 = get_entry(&dir, &Id::create_from_server_id("S1"));
    assert_eq!((s1.base_version, s1.server_version), (1, 1));
    assert!(!s1.is_unsynced && !s1.is_syncing);

    let s2 = get_entry(&dir, &Id::create_from_server_id("S2"));
    assert_eq!(s2.parent_id, Id::create_from_server_id("S1"));
    assert_eq!(s2.server_parent_id, Some(Id::create_from_server_id("S1")));
    assert_eq!((s2.base_version, s2.server_version), (1, 1));
    assert!(!s2.is_unsynced && !s2.is_syncing);

    assert!(dir.get_by_id(folder.id()).is_none());
    assert!(dir.get_by_id(child.id()).is_none());
    assert_eq!(session.status().syncer_status().num_successful_commits, 2);
    assert_eq!(
        session.status().syncer_status().num_successful_bookmark_commits,
        2
    );
}

#[test]
fn conflict_is_recorded_and_retried() {
    let item = server_item("A", &Id::root(), "A", 3);
    let dir = DirectoryBuilder::new().entry(item.clone()).build();
    let commit = CommitBuilder::new(&dir).item(item.id(), ModelType::Bookmarks).build();
    let response = ResponseBuilder::new().conflict().build();

    let (result, session) = process(&dir, &commit, &response);

    assert_eq!(result, SyncerError::ServerReturnTransientError);
    assert!(session.status().conflict_progress().has_conflicting_item(item.id()));
    let entry = get_entry(&dir, item.id());
    assert!(entry.is_unsynced);
    assert!(!entry.is_syncing);
    assert_eq!(entry.base_version, 3);
}

#[test]
fn conflict_marking_is_idempotent() {
    let item = server_item("A", &Id::root(), "A", 3);
    let dir = DirectoryBuilder::new().entry(item.clone()).build();
    let commit = CommitBuilder::new(&dir).item(item.id(), ModelType::Bookmarks).build();
    let response = ResponseBuilder::new().conflict().build();

    let mut session = session(&dir, &CommitProcessingConfig::default());
    let first = run(&mut session, &commit, &response).unwrap();
    let second = run(&mut session, &commit, &response).unwrap();

    assert_eq!(first, SyncerError::ServerReturnTransientError);
    assert_eq!(second, SyncerError::ServerReturnTransientError);
    assert_eq!(session.status().conflict_progress().conflicting_items_size(), 1);
}

#[test]
fn size_mismatch_only_clears_syncing() {
    let a = client_item(&Id::root(), "a");
    let b = client_item(&Id::root(), "b");
    let dir = DirectoryBuilder::new().entry(a.clone()).entry(b.clone()).build();
    let commit = CommitBuilder::new(&dir)
        .item(a.id(), ModelType::Bookmarks)
        .item(b.id(), ModelType::Bookmarks)
        .build();
    let before = snapshot(&dir);
    let response = ResponseBuilder::new().success("1", 1).build();

    let (result, session) = process(&dir, &commit, &response);

    assert_eq!(result, SyncerError::ServerResponseValidationFailed);
    let expected: Vec<EntryKernel> = before
        .into_iter()
        .map(|mut kernel| {
            kernel.is_syncing = false;
            kernel
        })
        .collect();
    assert_eq!(snapshot(&dir), expected);
    assert_eq!(session.status().syncer_status().num_successful_commits, 0);
}

#[test]
fn missing_commit_body_fails_validation() {
    let a = client_item(&Id::root(), "a");
    let dir = DirectoryBuilder::new().entry(a.clone()).build();
    let commit = CommitBuilder::new(&dir).item(a.id(), ModelType::Bookmarks).build();
    let response = ClientToServerResponse::default();

    let (result, _) = process(&dir, &commit, &response);

    assert_eq!(result, SyncerError::ServerResponseValidationFailed);
    let entry = get_entry(&dir, a.id());
    assert!(!entry.is_syncing);
    assert!(entry.is_unsynced);
}

#[test]
fn deleted_tagged_item_resets_version() {
    let mut item = server_item("P", &Id::root(), "pref", 10)
        .with_unique_client_tag("pref:theme")
        .deleted();
    item.specifics = syncdir_protocol::EntitySpecifics::new(ModelType::Preferences, vec![1]);
    let dir = DirectoryBuilder::new().entry(item.clone()).build();
    let commit = CommitBuilder::new(&dir).item(item.id(), ModelType::Preferences).build();
    let response = ResponseBuilder::new().success("P", 11).build();

    let (result, _) = process(&dir, &commit, &response);

    assert_eq!(result, SyncerError::Ok);
    let entry = get_entry(&dir, item.id());
    assert_eq!((entry.base_version, entry.server_version), (0, 0));
    assert!(entry.server_is_del);
    assert!(!entry.is_unsynced);
}

#[test]
fn local_edit_during_commit_is_preserved() {
    let item = server_item("A", &Id::root(), "before", 3).with_position(1);
    let dir = DirectoryBuilder::new().entry(item.clone()).build();
    let commit = CommitBuilder::new(&dir).item(item.id(), ModelType::Bookmarks).build();

    // A local edit lands while the commit is in flight.
    dir.transaction(Writer::Local, |txn| {
        let entry = txn.get_by_id_mut(item.id())?;
        entry.name = "edited".into();
        entry.position_in_parent = 9;
        entry.is_syncing = false;
        Ok::<_, syncdir_core::CoreError>(())
    })
    .unwrap();

    let response = ResponseBuilder::new()
        .entry(EntryResponse::success("A", 4).with_name("canonical").with_position(2))
        .build();
    let (result, _) = process(&dir, &commit, &response);

    assert_eq!(result, SyncerError::Ok);
    let entry = get_entry(&dir, item.id());
    assert_eq!(entry.base_version, 4);
    assert_eq!(entry.server_name, "canonical");
    assert_eq!(entry.server_position_in_parent, 2);
    assert_eq!(entry.name, "edited");
    assert_eq!(entry.position_in_parent, 9);
    assert!(entry.is_unsynced);
}

#[test]
fn server_canonicalizes_visible_fields() {
    let item = client_item(&Id::root(), "draft").with_position(1);
    let dir = DirectoryBuilder::new().entry(item.clone()).build();
    let commit = CommitBuilder::new(&dir).item(item.id(), ModelType::Bookmarks).build();
    let response = ResponseBuilder::new()
        .entry(EntryResponse::success("7", 1).with_name("Final").with_position(20))
        .build();

    let (result, _) = process(&dir, &commit, &response);

    assert_eq!(result, SyncerError::Ok);
    let entry = get_entry(&dir, &Id::create_from_server_id("7"));
    assert_eq!(entry.name, "Final");
    assert_eq!(entry.position_in_parent, 20);
    assert_eq!(entry.server_name, "Final");
}

#[test]
fn version_regression_is_invalid() {
    let item = server_item("A", &Id::root(), "a", 10);
    let dir = DirectoryBuilder::new().entry(item.clone()).build();
    let commit = CommitBuilder::new(&dir).item(item.id(), ModelType::Bookmarks).build();
    let response = ResponseBuilder::new().success("A", 9).build();

    let (result, session) = process(&dir, &commit, &response);

    assert_eq!(result, SyncerError::ServerReturnUnknownError);
    let entry = get_entry(&dir, item.id());
    assert_eq!(entry.base_version, 10);
    assert!(entry.is_unsynced);
    assert!(!entry.is_syncing);
    assert_eq!(session.status().syncer_status().num_successful_commits, 0);
}

#[test]
fn duplicate_server_id_is_invalid() {
    let existing = server_item("taken", &Id::root(), "existing", 1);
    let item = client_item(&Id::root(), "new");
    let dir = DirectoryBuilder::new()
        .entry(existing.clone())
        .entry(item.clone())
        .build();
    let commit = CommitBuilder::new(&dir).item(item.id(), ModelType::Bookmarks).build();
    let response = ResponseBuilder::new().success("taken", 1).build();

    let (result, _) = process(&dir, &commit, &response);

    assert_eq!(result, SyncerError::ServerReturnUnknownError);
    assert!(get_entry(&dir, item.id()).is_unsynced);
    assert_eq!(get_entry(&dir, existing.id()).name, "existing");
}

#[test]
fn one_bad_item_does_not_block_others() {
    let good = client_item(&Id::root(), "good");
    let retry = client_item(&Id::root(), "retry");
    let quota = client_item(&Id::root(), "quota");
    let dir = DirectoryBuilder::new()
        .entries([good.clone(), retry.clone(), quota.clone()])
        .build();
    let commit = CommitBuilder::new(&dir)
        .item(good.id(), ModelType::Bookmarks)
        .item(retry.id(), ModelType::Bookmarks)
        .item(quota.id(), ModelType::Bookmarks)
        .build();
    let response = ResponseBuilder::new()
        .success("g", 1)
        .outcome(ResponseType::Retry)
        .entry(EntryResponse::with_type(ResponseType::OverQuota).with_error("quota"))
        .build();

    let (result, session) = process(&dir, &commit, &response);

    assert_eq!(result, SyncerError::ServerReturnTransientError);
    assert!(!get_entry(&dir, &Id::create_from_server_id("g")).is_unsynced);
    for id in [retry.id(), quota.id()] {
        let entry = get_entry(&dir, id);
        assert!(entry.is_unsynced && !entry.is_syncing);
    }
    assert_eq!(session.status().syncer_status().num_successful_commits, 1);
}

#[test]
fn invalid_outranks_transient() {
    let a = client_item(&Id::root(), "a");
    let b = client_item(&Id::root(), "b");
    let dir = DirectoryBuilder::new().entries([a.clone(), b.clone()]).build();
    let commit = CommitBuilder::new(&dir)
        .item(a.id(), ModelType::Bookmarks)
        .item(b.id(), ModelType::Bookmarks)
        .build();
    let response = ResponseBuilder::new()
        .outcome(ResponseType::TransientError)
        .entry(EntryResponse::with_type(ResponseType::InvalidMessage).with_error("bad"))
        .build();

    let (result, _) = process(&dir, &commit, &response);
    assert_eq!(result, SyncerError::ServerReturnUnknownError);
}

#[test]
fn committed_folder_deletion_settles_deleted_children() {
    let folder = server_item("F", &Id::root(), "folder", 2).folder().deleted();
    let child = server_item("C", folder.id(), "child", 2).deleted();
    let dir = DirectoryBuilder::new()
        .entry(folder.clone())
        .entry(child.clone())
        .build();
    let commit = CommitBuilder::new(&dir).item(folder.id(), ModelType::Bookmarks).build();
    // The child was queued in an earlier, still outstanding commit.
    dir.transaction(Writer::Unittest, |txn| {
        txn.get_by_id_mut(child.id())?.is_syncing = true;
        Ok::<_, syncdir_core::CoreError>(())
    })
    .unwrap();
    let response = ResponseBuilder::new().success("F", 3).build();

    let (result, _) = process(&dir, &commit, &response);

    assert_eq!(result, SyncerError::Ok);
    let folder = get_entry(&dir, folder.id());
    assert!(folder.server_is_del && !folder.is_unsynced);
    let child = get_entry(&dir, child.id());
    assert!(!child.is_syncing);
    assert!(child.is_unsynced);
}

#[test]
fn each_group_pass_only_touches_its_items() {
    let bookmark = client_item(&Id::root(), "bookmark");
    let pref = client_item(&Id::root(), "pref");
    let dir = DirectoryBuilder::new()
        .entries([bookmark.clone(), pref.clone()])
        .build();
    let commit = CommitBuilder::new(&dir)
        .item(bookmark.id(), ModelType::Bookmarks)
        .item(pref.id(), ModelType::Preferences)
        .build();
    let response = ResponseBuilder::new().success("b", 1).success("p", 1).build();
    let config = CommitProcessingConfig::new()
        .with_route(ModelType::Bookmarks, ModelSafeGroup::Ui)
        .with_route(ModelType::Preferences, ModelSafeGroup::Db);

    let set = commit_set(&commit);
    let command = ProcessCommitResponseCommand::new(&set, &commit.message, &response);
    let mut session = session(&dir, &config);

    assert_eq!(
        command.groups_to_change(&session).into_iter().collect::<Vec<_>>(),
        vec![ModelSafeGroup::Ui, ModelSafeGroup::Db]
    );

    let result = session
        .with_group_restriction(ModelSafeGroup::Ui, |s| command.model_changing_execute(s))
        .unwrap();
    assert_eq!(result, SyncerError::Ok);
    assert!(dir.get_by_id(&Id::create_from_server_id("b")).is_some());
    let pref_entry = get_entry(&dir, pref.id());
    assert!(pref_entry.is_syncing && pref_entry.is_unsynced);

    let result = session
        .with_group_restriction(ModelSafeGroup::Db, |s| command.model_changing_execute(s))
        .unwrap();
    assert_eq!(result, SyncerError::Ok);
    assert!(dir.get_by_id(&Id::create_from_server_id("p")).is_some());
    assert_eq!(session.status().syncer_status().num_successful_commits, 2);
}

#[test]
fn multi_group_result_reports_failing_group() {
    let bookmark = client_item(&Id::root(), "bookmark");
    let pref = client_item(&Id::root(), "pref");
    let dir = DirectoryBuilder::new()
        .entries([bookmark.clone(), pref.clone()])
        .build();
    let commit = CommitBuilder::new(&dir)
        .item(bookmark.id(), ModelType::Bookmarks)
        .item(pref.id(), ModelType::Preferences)
        .build();
    let response = ResponseBuilder::new()
        .success("b", 1)
        .outcome(ResponseType::TransientError)
        .build();
    let config = CommitProcessingConfig::new().with_route(ModelType::Bookmarks, ModelSafeGroup::Ui);

    let mut session = session(&dir, &config);
    let result = run(&mut session, &commit, &response).unwrap();

    // Preferences are unrouted, so they fall in the passive group.
    assert_eq!(result, SyncerError::ServerReturnTransientError);
    assert!(dir.get_by_id(&Id::create_from_server_id("b")).is_some());
    assert!(get_entry(&dir, pref.id()).is_unsynced);
}

#[test]
fn commit_set_built_apart_from_config_is_processed() {
    let item = client_item(&Id::root(), "bookmark");
    let dir = DirectoryBuilder::new().entry(item.clone()).build();
    let commit = CommitBuilder::new(&dir).item(item.id(), ModelType::Bookmarks).build();
    let response = ResponseBuilder::new().success("S", 1).build();

    let mut set = OrderedCommitSet::new();
    set.add_commit_item(item.id().clone(), ModelType::Bookmarks);
    let config = CommitProcessingConfig::new().with_route(ModelType::Bookmarks, ModelSafeGroup::Ui);
    let mut session = session(&dir, &config);

    let command = ProcessCommitResponseCommand::new(&set, &commit.message, &response);
    let result = command.execute(&mut session).unwrap();

    assert_eq!(result, SyncerError::Ok);
    assert!(dir.get_by_id(item.id()).is_none());
    let entry = get_entry(&dir, &Id::create_from_server_id("S"));
    assert!(!entry.is_syncing && !entry.is_unsynced);
    assert_eq!(session.status().syncer_status().num_successful_commits, 1);
}

#[test]
fn every_item_leaves_syncing_across_groups() {
    let items: Vec<(EntryKernel, ModelType)> = [
        ModelType::Bookmarks,
        ModelType::Preferences,
        ModelType::Passwords,
        ModelType::Themes,
        ModelType::Bookmarks,
    ]
    .into_iter()
    .enumerate()
    .map(|(i, model_type)| (client_item(&Id::root(), &format!("item {i}")), model_type))
    .collect();
    let dir = DirectoryBuilder::new()
        .entries(items.iter().map(|(kernel, _)| kernel.clone()))
        .build();
    let commit = items
        .iter()
        .fold(CommitBuilder::new(&dir), |b, (kernel, model_type)| {
            b.item(kernel.id(), *model_type)
        })
        .build();
    let response = ResponseBuilder::new()
        .success("b0", 1)
        .conflict()
        .outcome(ResponseType::InvalidMessage)
        .outcome(ResponseType::TransientError)
        .success("b4", 1)
        .build();

    let mut routing = ModelSafeRoutingInfo::new();
    routing.insert(ModelType::Bookmarks, ModelSafeGroup::Ui);
    routing.insert(ModelType::Preferences, ModelSafeGroup::Db);
    routing.insert(ModelType::Passwords, ModelSafeGroup::Password);
    let config = CommitProcessingConfig::new().with_routing(routing);
    let mut session = session(&dir, &config);

    let result = run(&mut session, &commit, &response).unwrap();

    assert_eq!(result, SyncerError::ServerReturnTransientError);
    for id in [
        Id::create_from_server_id("b0"),
        items[1].0.id().clone(),
        items[2].0.id().clone(),
        items[3].0.id().clone(),
        Id::create_from_server_id("b4"),
    ] {
        assert!(!get_entry(&dir, &id).is_syncing, "{id} still syncing");
    }
    assert_eq!(session.status().syncer_status().num_successful_commits, 2);
    assert!(session
        .status()
        .conflict_progress()
        .has_conflicting_item(items[1].0.id()));
}

#[test]
fn extension_activity_returned_when_bookmarks_fail() {
    let item = client_item(&Id::root(), "bookmark");
    let dir = DirectoryBuilder::new().entry(item.clone()).build();
    let commit = CommitBuilder::new(&dir).item(item.id(), ModelType::Bookmarks).build();
    let response = ResponseBuilder::new().outcome(ResponseType::TransientError).build();

    let mut session = session(&dir, &CommitProcessingConfig::default());
    session.extensions_monitor().on_bookmark_write("ext");
    session.snapshot_extensions_activity();
    assert!(session.extensions_monitor().is_empty());

    run(&mut session, &commit, &response).unwrap();

    assert!(session.extensions_activity().is_empty());
    let returned = session.extensions_monitor().get_and_clear_records();
    assert_eq!(returned["ext"].bookmark_write_count, 1);
}

#[test]
fn extension_activity_discarded_when_bookmarks_commit() {
    let item = client_item(&Id::root(), "bookmark");
    let dir = DirectoryBuilder::new().entry(item.clone()).build();
    let commit = CommitBuilder::new(&dir).item(item.id(), ModelType::Bookmarks).build();
    let response = ResponseBuilder::new().success("1", 1).build();

    let mut session = session(&dir, &CommitProcessingConfig::default());
    session.extensions_monitor().on_bookmark_write("ext");
    session.snapshot_extensions_activity();

    run(&mut session, &commit, &response).unwrap();

    assert!(session.extensions_activity().is_empty());
    assert!(session.extensions_monitor().is_empty());
}

#[test]
fn extension_activity_untouched_without_bookmarks() {
    let item = client_item(&Id::root(), "pref");
    let dir = DirectoryBuilder::new().entry(item.clone()).build();
    let commit = CommitBuilder::new(&dir).item(item.id(), ModelType::Preferences).build();
    let response = ResponseBuilder::new().outcome(ResponseType::Retry).build();

    let mut session = session(&dir, &CommitProcessingConfig::default());
    session.extensions_monitor().on_bookmark_write("ext");
    session.snapshot_extensions_activity();

    run(&mut session, &commit, &response).unwrap();

    assert_eq!(session.extensions_activity().len(), 1);
    assert!(session.extensions_monitor().is_empty());
}

#[test]
fn messages_survive_the_wire() {
    let item = client_item(&Id::root(), "wire");
    let dir = DirectoryBuilder::new().entry(item.clone()).build();
    let mut commit = CommitBuilder::new(&dir).item(item.id(), ModelType::Bookmarks).build();
    let response = ResponseBuilder::new().success("w", 5).build();

    commit.message = ClientToServerMessage::decode(&commit.message.encode().unwrap()).unwrap();
    let response = ClientToServerResponse::decode(&response.encode().unwrap()).unwrap();
    let (result, _) = process(&dir, &commit, &response);

    assert_eq!(result, SyncerError::Ok);
    assert_eq!(get_entry(&dir, &Id::create_from_server_id("w")).base_version, 5);
}

#[test]
fn readers_never_see_a_partial_pass() {
    let a = client_item(&Id::root(), "a");
    let dir = DirectoryBuilder::new().entry(a.clone()).build();
    let commit = CommitBuilder::new(&dir).item(a.id(), ModelType::Bookmarks).build();
    let response = Arc::new(ResponseBuilder::new().success("1", 1).build());

    let reader = {
        let dir = Arc::clone(&dir);
        let old = a.id().clone();
        std::thread::spawn(move || {
            for _ in 0..200 {
                let txn = dir.read();
                let old_present = txn.get_by_id(&old).is_some();
                let new_present = txn.get_by_id(&Id::create_from_server_id("1")).is_some();
                assert!(old_present != new_present);
            }
        })
    };

    let (result, _) = process(&dir, &commit, &response);
    reader.join().unwrap();
    assert_eq!(result, SyncerError::Ok);
}
