//! Server responses to a commit.

use crate::codec::{from_cbor, to_cbor};
use crate::error::ProtocolResult;
use serde::{Deserialize, Serialize};

/// The server's verdict on one committed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseType {
    /// The commit was applied.
    Success,
    /// The server holds a newer version the client has not seen.
    Conflict,
    /// The server asks the client to retry later.
    Retry,
    /// The item was malformed.
    InvalidMessage,
    /// The account is over quota.
    OverQuota,
    /// A temporary server-side failure.
    TransientError,
}

impl ResponseType {
    /// Converts to the numeric wire code.
    pub fn to_code(&self) -> i32 {
        match self {
            ResponseType::Success => 1,
            ResponseType::Conflict => 2,
            ResponseType::Retry => 3,
            ResponseType::InvalidMessage => 4,
            ResponseType::OverQuota => 5,
            ResponseType::TransientError => 6,
        }
    }

    /// Converts from a numeric wire code.
    ///
    /// Returns `None` for codes this client does not know.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(ResponseType::Success),
            2 => Some(ResponseType::Conflict),
            3 => Some(ResponseType::Retry),
            4 => Some(ResponseType::InvalidMessage),
            5 => Some(ResponseType::OverQuota),
            6 => Some(ResponseType::TransientError),
            _ => None,
        }
    }
}

/// Per-item part of a commit response.
///
/// `response_type` is kept as the raw wire code so that values from a newer
/// server survive decoding and can be reported as unrecognized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryResponse {
    /// Raw response type code.
    pub response_type: i32,
    /// Wire identifier the server assigned to the item.
    pub id_string: Option<String>,
    /// Wire identifier of the parent, as the server sees it.
    pub parent_id_string: Option<String>,
    /// Absolute position among siblings chosen by the server.
    pub position_in_parent: Option<i64>,
    /// New version of the item.
    pub version: Option<i64>,
    /// Legacy name field.
    pub name: Option<String>,
    /// Display name chosen by the server.
    pub non_unique_name: Option<String>,
    /// Server-side error description.
    pub error_message: Option<String>,
    /// Modification time recorded by the server.
    pub mtime: Option<i64>,
}

impl EntryResponse {
    /// Creates a response of the given type with no other fields.
    pub fn with_type(response_type: ResponseType) -> Self {
        Self {
            response_type: response_type.to_code(),
            ..Self::default()
        }
    }

    /// Creates a successful response assigning `id_string` at `version`.
    pub fn success(id_string: impl Into<String>, version: i64) -> Self {
        Self {
            id_string: Some(id_string.into()),
            version: Some(version),
            ..Self::with_type(ResponseType::Success)
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.non_unique_name = Some(name.into());
        self
    }

    /// Sets the position among siblings.
    pub fn with_position(mut self, position: i64) -> Self {
        self.position_in_parent = Some(position);
        self
    }

    /// Sets the error message.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Returns the decoded response type, or `None` if unrecognized.
    pub fn response_type(&self) -> Option<ResponseType> {
        ResponseType::from_code(self.response_type)
    }

    /// Returns the reported version, treating an absent version as 0.
    pub fn version(&self) -> i64 {
        self.version.unwrap_or(0)
    }

    /// Returns the name carried by the response, or `""` if none.
    pub fn resolved_name(&self) -> &str {
        self.non_unique_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("")
    }
}

/// Body of a commit response: one entry per committed item, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResponse {
    /// Per-item responses.
    pub entry_response: Vec<EntryResponse>,
}

impl CommitResponse {
    /// Creates a commit response.
    pub fn new(entry_response: Vec<EntryResponse>) -> Self {
        Self { entry_response }
    }
}

/// Envelope for any server response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientToServerResponse {
    /// Commit body, for commit responses.
    pub commit: Option<CommitResponse>,
    /// Envelope-level error description.
    pub error_message: Option<String>,
}

impl ClientToServerResponse {
    /// Creates a commit response envelope.
    pub fn commit(entry_response: Vec<EntryResponse>) -> Self {
        Self {
            commit: Some(CommitResponse::new(entry_response)),
            error_message: None,
        }
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
