//! Outgoing commit messages.

use crate::codec::{from_cbor, to_cbor};
use crate::error::{ProtocolError, ProtocolResult};
use crate::specifics::EntitySpecifics;
use serde::{Deserialize, Serialize};

/// Protocol version spoken by this client.
pub const PROTOCOL_VERSION: i32 = 31;

/// One item in an outgoing commit.
///
/// Identifiers travel in their wire form (no origin prefix); the store's
/// `Id` type converts between the two.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncEntity {
    /// Wire identifier of the item at commit time.
    pub id_string: String,
    /// Wire identifier of the parent.
    pub parent_id_string: Option<String>,
    /// Wire identifier of the parent the server last saw.
    pub old_parent_id: Option<String>,
    /// Base version the client is committing on top of (0 for new items).
    pub version: i64,
    /// Modification time in milliseconds since the Unix epoch.
    pub mtime: i64,
    /// Creation time in milliseconds since the Unix epoch.
    pub ctime: i64,
    /// Legacy name field.
    pub name: String,
    /// Display name; takes precedence over `name` when present.
    pub non_unique_name: Option<String>,
    /// Whether this commit deletes the item.
    pub deleted: bool,
    /// Whether the item is a folder.
    pub folder: bool,
    /// Requested position among siblings.
    pub position_in_parent: Option<i64>,
    /// Wire identifier of the preceding sibling.
    pub insert_after_item_id: Option<String>,
    /// Stable client-defined tag for undeletable items.
    pub client_defined_unique_tag: Option<String>,
    /// Type-specific payload.
    pub specifics: EntitySpecifics,
}

impl SyncEntity {
    /// Creates an entity with the given wire id, parent and name.
    pub fn new(
        id_string: impl Into<String>,
        parent_id_string: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id_string: id_string.into(),
            parent_id_string: Some(parent_id_string.into()),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the name the server will store for this entity.
    pub fn resolved_name(&self) -> &str {
        self.non_unique_name.as_deref().unwrap_or(&self.name)
    }
}

/// Extension activity reported alongside bookmark commits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionActivityRecord {
    /// Extension identifier.
    pub extension_id: String,
    /// Number of bookmark writes the extension performed.
    pub bookmark_write_count: u32,
}

/// Body of a commit request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMessage {
    /// Items in commit order.
    pub entries: Vec<SyncEntity>,
    /// Identifies this client's cache to the server.
    pub cache_guid: String,
    /// Extension activity since the last successful bookmark commit.
    pub extensions_activity: Vec<ExtensionActivityRecord>,
}

impl CommitMessage {
    /// Creates a commit body from the given entries.
    pub fn new(entries: Vec<SyncEntity>, cache_guid: impl Into<String>) -> Self {
        Self {
            entries,
            cache_guid: cache_guid.into(),
            extensions_activity: Vec::new(),
        }
    }
}

/// Envelope for any client request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientToServerMessage {
    /// Account the request is made for.
    pub share: String,
    /// Protocol version.
    pub protocol_version: i32,
    /// Commit body, for commit requests.
    pub commit: Option<CommitMessage>,
}

impl ClientToServerMessage {
    /// Creates a commit request.
    pub fn commit(share: impl Into<String>, commit: CommitMessage) -> Self {
        Self {
            share: share.into(),
            protocol_version: PROTOCOL_VERSION,
            commit: Some(commit),
        }
    }

    /// Returns the commit body, or an error when this is not a commit.
    pub fn commit_body(&self) -> ProtocolResult<&CommitMessage> {
        self.commit
            .as_ref()
            .ok_or(ProtocolError::MissingField { field: "commit" })
    }

    /// Encodes to CBOR.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        to_cbor(self)
    }

    /// Decodes from CBOR.
    pub fn decode(bytes: &[u8]) -> ProtocolResult<Self> {
        from_cbor(bytes)
    }
}
