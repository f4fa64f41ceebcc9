//! Entry identifier.

use std::fmt;
use uuid::Uuid;

const ROOT_TAG: char = 'r';
const SERVER_TAG: char = 's';
const CLIENT_TAG: char = 'c';

/// Identifier of an entry.
///
/// The first character records where the identifier came from:
/// - `c`: minted locally, not yet known to the server (temporary)
/// - `s`: assigned by the server (permanent)
/// - `r`: the root of the tree
///
/// The wire form drops the tag; the root travels as `"0"`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(String);

impl Id {
    /// Returns the root identifier.
    #[must_use]
    pub fn root() -> Self {
        Self(ROOT_TAG.to_string())
    }

    /// Mints a new random client-local identifier.
    #[must_use]
    pub fn new_client_id() -> Self {
        Self(format!("{CLIENT_TAG}{}", Uuid::new_v4()))
    }

    /// Creates an identifier from a server-assigned wire string.
    #[must_use]
    pub fn create_from_server_id(server_id: &str) -> Self {
        if server_id == "0" {
            Self::root()
        } else {
            Self(format!("{SERVER_TAG}{server_id}"))
        }
    }

    /// Creates a client-local identifier from a string.
    #[must_use]
    pub fn create_from_client_string(local_id: &str) -> Self {
        if local_id == "0" {
            Self::root()
        } else {
            Self(format!("{CLIENT_TAG}{local_id}"))
        }
    }

    /// Returns true if the server has seen this identifier.
    #[must_use]
    pub fn server_knows(&self) -> bool {
        matches!(self.tag(), Some(SERVER_TAG) | Some(ROOT_TAG))
    }

    /// Returns true for the root identifier.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.tag() == Some(ROOT_TAG)
    }

    /// Returns the identifier in wire form.
    #[must_use]
    pub fn server_id(&self) -> &str {
        if self.is_root() {
            "0"
        } else {
            &self.0[1..]
        }
    }

    /// Returns the tagged string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn tag(&self) -> Option<char> {
        self.0.chars().next()
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.0)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
