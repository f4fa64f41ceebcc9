//! Directory fixtures and commit request/response builders.
//!
//! Provides convenience functions for setting up directories and the
//! messages of one commit round trip.

use std::sync::Arc;
use syncdir_core::{Directory, EntryKernel, EntryReader, Id, Writer};
use syncdir_protocol::{
    ClientToServerMessage, ClientToServerResponse, CommitMessage, EntitySpecifics,
    EntryResponse, ExtensionActivityRecord, ModelType, ResponseType, SyncEntity,
};

/// Share name used by fixture messages.
pub const TEST_SHARE: &str = "test@example.com";

/// Cache GUID used by fixture messages.
pub const TEST_CACHE_GUID: &str = "test-cache-guid";

/// A new, never-committed folder with local edits.
pub fn client_folder(parent: &Id, name: &str) -> EntryKernel {
    EntryKernel::new(Id::new_client_id(), parent.clone(), name)
        .folder()
        .with_specifics(EntitySpecifics::new(ModelType::Bookmarks, Vec::new()))
        .with_unsynced()
}

/// A new, never-committed item with local edits.
pub fn client_item(parent: &Id, name: &str) -> EntryKernel {
    EntryKernel::new(Id::new_client_id(), parent.clone(), name)
        .with_specifics(EntitySpecifics::new(ModelType::Bookmarks, Vec::new()))
        .with_unsynced()
}

/// An item the server already knows at `version`, with local edits.
pub fn server_item(server_id: &str, parent: &Id, name: &str, version: i64) -> EntryKernel {
    let mut kernel = EntryKernel::new(Id::create_from_server_id(server_id), parent.clone(), name)
        .with_specifics(EntitySpecifics::new(ModelType::Bookmarks, Vec::new()))
        .with_version(version)
        .with_unsynced();
    kernel.server_parent_id = Some(parent.clone());
    kernel.server_name = name.to_string();
    kernel
}

/// Builds a directory from fixture entries.
///
/// # Example
///
/// ```rust,ignore
/// let folder = client_folder(&Id::root(), "Folder");
/// let child = client_item(folder.id(), "Child");
/// let dir = DirectoryBuilder::new().entry(folder).entry(child).build();
/// ```
#[derive(Debug, Default)]
pub struct DirectoryBuilder {
    entries: Vec<EntryKernel>,
}

impl DirectoryBuilder {
    /// Creates a builder for an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    #[must_use]
    pub fn entry(mut self, kernel: EntryKernel) -> Self {
        self.entries.push(kernel);
        self
    }

    /// Adds several entries.
    #[must_use]
    pub fn entries(mut self, kernels: impl IntoIterator<Item = EntryKernel>) -> Self {
        self.entries.extend(kernels);
        self
    }

    /// Creates the directory.
    pub fn build(self) -> Arc<Directory> {
        let dir = Directory::new("test");
        let mut txn = dir.begin_write(Writer::Unittest);
        for kernel in self.entries {
            txn.create_entry(kernel).expect("fixture entry ids must be unique");
        }
        txn.commit();
        Arc::new(dir)
    }
}

/// Returns the committed entry with identifier `id`.
pub fn get_entry(dir: &Directory, id: &Id) -> EntryKernel {
    dir.get_by_id(id)
        .unwrap_or_else(|| panic!("no entry with id {id}"))
}

/// Returns every committed entry, root first.
pub fn snapshot(dir: &Directory) -> Vec<EntryKernel> {
    let txn = dir.read();
    txn.handles()
        .into_iter()
        .filter_map(|handle| txn.entry(handle).cloned())
        .collect()
}

/// Builds the wire form of an entry as it would be committed.
pub fn sync_entity_for(kernel: &EntryKernel) -> SyncEntity {
    let mut entity = SyncEntity::new(
        kernel.id().server_id(),
        kernel.parent_id.server_id(),
        kernel.name.clone(),
    );
    entity.old_parent_id = kernel
        .server_parent_id
        .as_ref()
        .map(|id| id.server_id().to_string());
    entity.version = kernel.base_version;
    entity.mtime = kernel.mtime;
    entity.ctime = kernel.ctime;
    entity.non_unique_name = Some(kernel.name.clone());
    entity.deleted = kernel.is_del;
    entity.folder = kernel.is_dir;
    entity.position_in_parent = Some(kernel.position_in_parent);
    entity.client_defined_unique_tag = kernel.unique_client_tag.clone();
    entity.specifics = kernel.specifics.clone();
    entity
}

/// The request side of one commit round trip.
#[derive(Debug, Clone)]
pub struct CommitFixture {
    /// Pre-commit identifiers and types, in request order.
    pub items: Vec<(Id, ModelType)>,
    /// The message sent to the server.
    pub message: ClientToServerMessage,
}

impl CommitFixture {
    /// Returns the pre-commit identifiers, in request order.
    pub fn ids(&self) -> Vec<Id> {
        self.items.iter().map(|(id, _)| id.clone()).collect()
    }

    /// Returns the number of committed items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing is committed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Builds the commit message for entries of a directory.
///
/// Building marks every included entry as syncing, the way the commit
/// builder of a real sync cycle does before sending.
pub struct CommitBuilder<'d> {
    dir: &'d Directory,
    items: Vec<(Id, ModelType)>,
    extensions_activity: Vec<ExtensionActivityRecord>,
}

impl<'d> CommitBuilder<'d> {
    /// Creates a builder over `dir`.
    pub fn new(dir: &'d Directory) -> Self {
        Self {
            dir,
            items: Vec::new(),
            extensions_activity: Vec::new(),
        }
    }

    /// Adds the entry with identifier `id`.
    #[must_use]
    pub fn item(mut self, id: &Id, model_type: ModelType) -> Self {
        self.items.push((id.clone(), model_type));
        self
    }

    /// Attaches extension activity to the message.
    #[must_use]
    pub fn extension_activity(mut self, extension_id: &str, bookmark_write_count: u32) -> Self {
        self.extensions_activity.push(ExtensionActivityRecord {
            extension_id: extension_id.to_string(),
            bookmark_write_count,
        });
        self
    }

    /// Marks the entries syncing and returns the request.
    pub fn build(self) -> CommitFixture {
        let mut txn = self.dir.begin_write(Writer::Unittest);
        let mut entries = Vec::with_capacity(self.items.len());
        for (id, _) in &self.items {
            let kernel = txn
                .get_by_id_mut(id)
                .unwrap_or_else(|_| panic!("no entry with id {id}"));
            kernel.is_syncing = true;
            kernel.is_unsynced = true;
            entries.push(sync_entity_for(kernel));
        }
        txn.commit();

        let mut commit = CommitMessage::new(entries, TEST_CACHE_GUID);
        commit.extensions_activity = self.extensions_activity;
        CommitFixture {
            items: self.items,
            message: ClientToServerMessage::commit(TEST_SHARE, commit),
        }
    }
}

/// Builds a commit response entry by entry.
#[derive(Debug, Default)]
pub struct ResponseBuilder {
    entries: Vec<EntryResponse>,
}

impl ResponseBuilder {
    /// Creates an empty response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    #[must_use]
    pub fn entry(mut self, entry: EntryResponse) -> Self {
        self.entries.push(entry);
        self
    }

    /// Adds a success assigning server id `id_string` at `version`.
    #[must_use]
    pub fn success(self, id_string: &str, version: i64) -> Self {
        self.entry(EntryResponse::success(id_string, version))
    }

    /// Adds a success that keeps the item's current identifier.
    #[must_use]
    pub fn success_for(self, id: &Id, version: i64) -> Self {
        self.success(id.server_id(), version)
    }

    /// Adds a non-success outcome.
    #[must_use]
    pub fn outcome(self, response_type: ResponseType) -> Self {
        self.entry(EntryResponse::with_type(response_type))
    }

    /// Adds a conflict.
    #[must_use]
    pub fn conflict(self) -> Self {
        self.outcome(ResponseType::Conflict)
    }

    /// Returns the response.
    pub fn build(self) -> ClientToServerResponse {
        ClientToServerResponse::commit(self.entries)
    }
}
