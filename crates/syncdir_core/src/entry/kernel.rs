//! The stored form of one item.

use crate::entry::Id;
use syncdir_protocol::{EntitySpecifics, ModelType};

/// One item in the directory.
///
/// Fields come in two families:
/// - visible fields (`name`, `position_in_parent`, `is_del`, ...) hold the
///   local state, including edits not yet committed;
/// - `server_*` fields shadow what the server last confirmed.
///
/// The identifier is only changed through
/// [`WriteTransaction::change_id_and_update_children`](crate::WriteTransaction::change_id_and_update_children)
/// so the directory's id index stays consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryKernel {
    pub(crate) id: Id,
    /// Identifier of the parent entry.
    pub parent_id: Id,
    /// Last version the client believes the server has.
    pub base_version: i64,
    /// Last version observed from the server.
    pub server_version: i64,
    /// A commit carrying this entry is in flight.
    pub is_syncing: bool,
    /// The entry has local edits not yet confirmed committed.
    pub is_unsynced: bool,
    /// A downloaded update has not been applied yet.
    pub is_unapplied_update: bool,
    /// The entry is deleted locally.
    pub is_del: bool,
    /// The entry is a folder.
    pub is_dir: bool,
    /// Display name.
    pub name: String,
    /// Position among siblings.
    pub position_in_parent: i64,
    /// Stable client tag for undeletable items.
    pub unique_client_tag: Option<String>,
    /// Type-specific payload.
    pub specifics: EntitySpecifics,
    /// Modification time in milliseconds since the Unix epoch.
    pub mtime: i64,
    /// Creation time in milliseconds since the Unix epoch.
    pub ctime: i64,
    /// Parent the server last confirmed.
    pub server_parent_id: Option<Id>,
    /// Deletion state the server last confirmed.
    pub server_is_del: bool,
    /// Folder flag the server last confirmed.
    pub server_is_dir: bool,
    /// Name the server last confirmed.
    pub server_name: String,
    /// Position the server last confirmed.
    pub server_position_in_parent: i64,
    /// Payload the server last confirmed.
    pub server_specifics: EntitySpecifics,
    /// Modification time the server last confirmed.
    pub server_mtime: i64,
    /// Creation time the server last confirmed.
    pub server_ctime: i64,
}

impl EntryKernel {
    /// Creates a fresh, never-committed entry.
    pub fn new(id: Id, parent_id: Id, name: impl Into<String>) -> Self {
        Self {
            id,
            parent_id,
            base_version: 0,
            server_version: 0,
            is_syncing: false,
            is_unsynced: false,
            is_unapplied_update: false,
            is_del: false,
            is_dir: false,
            name: name.into(),
            position_in_parent: 0,
            unique_client_tag: None,
            specifics: EntitySpecifics::default(),
            mtime: 0,
            ctime: 0,
            server_parent_id: None,
            server_is_del: false,
            server_is_dir: false,
            server_name: String::new(),
            server_position_in_parent: 0,
            server_specifics: EntitySpecifics::default(),
            server_mtime: 0,
            server_ctime: 0,
        }
    }

    /// Returns the identifier.
    pub fn id(&self) -> &Id {
        &self.id
    }

    /// Returns the model type of the payload.
    pub fn model_type(&self) -> ModelType {
        self.specifics.model_type()
    }

    /// Returns true if the entry carries a non-empty stable client tag.
    pub fn has_unique_client_tag(&self) -> bool {
        self.unique_client_tag
            .as_deref()
            .is_some_and(|tag| !tag.is_empty())
    }

    /// Marks the entry as a folder.
    #[must_use]
    pub fn folder(mut self) -> Self {
        self.is_dir = true;
        self
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_specifics(mut self, specifics: EntitySpecifics) -> Self {
        self.specifics = specifics;
        self
    }

    /// Sets base and server version.
    #[must_use]
    pub fn with_version(mut self, version: i64) -> Self {
        self.base_version = version;
        self.server_version = version;
        self
    }

    /// Sets the stable client tag.
    #[must_use]
    pub fn with_unique_client_tag(mut self, tag: impl Into<String>) -> Self {
        self.unique_client_tag = Some(tag.into());
        self
    }

    /// Sets the position among siblings.
    #[must_use]
    pub fn with_position(mut self, position: i64) -> Self {
        self.position_in_parent = position;
        self
    }

    /// Marks the entry as having local edits.
    #[must_use]
    pub fn with_unsynced(mut self) -> Self {
        self.is_unsynced = true;
        self
    }

    /// Marks the entry as having local edits with a commit in flight.
    #[must_use]
    pub fn syncing(mut self) -> Self {
        self.is_unsynced = true;
        self.is_syncing = true;
        self
    }

    /// Marks the entry as deleted.
    #[must_use]
    pub fn deleted(mut self) -> Self {
        self.is_del = true;
        self
    }
}
