//! Model types and type-specific payloads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The data type an item belongs to.
///
/// Every committed item carries exactly one model type; the engine uses it
/// to route the item to a model-safe group and to keep per-type tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModelType {
    /// Type could not be determined.
    Unspecified,
    /// Permanent top-level folders created by the server.
    TopLevelFolder,
    /// Bookmarks and bookmark folders.
    Bookmarks,
    /// Preferences.
    Preferences,
    /// Saved passwords.
    Passwords,
    /// Autofill entries.
    Autofill,
    /// Themes.
    Themes,
    /// Typed URLs.
    TypedUrls,
    /// Extensions.
    Extensions,
    /// Encryption keys.
    Nigori,
    /// Open sessions.
    Sessions,
    /// Apps.
    Apps,
}

impl ModelType {
    /// Returns a stable lowercase name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Unspecified => "unspecified",
            ModelType::TopLevelFolder => "top_level_folder",
            ModelType::Bookmarks => "bookmarks",
            ModelType::Preferences => "preferences",
            ModelType::Passwords => "passwords",
            ModelType::Autofill => "autofill",
            ModelType::Themes => "themes",
            ModelType::TypedUrls => "typed_urls",
            ModelType::Extensions => "extensions",
            ModelType::Nigori => "nigori",
            ModelType::Sessions => "sessions",
            ModelType::Apps => "apps",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque type-specific payload of an item.
///
/// The engine never interprets `value`; it only copies it between the
/// visible and server-shadow fields of an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpecifics {
    /// The type this payload belongs to, if known.
    pub model_type: Option<ModelType>,
    /// Serialized type-specific data.
    pub value: Vec<u8>,
}

impl EntitySpecifics {
    /// Creates a payload for the given type.
    pub fn new(model_type: ModelType, value: Vec<u8>) -> Self {
        Self {
            model_type: Some(model_type),
            value,
        }
    }

    /// Returns the model type, or `Unspecified` when absent.
    pub fn model_type(&self) -> ModelType {
        self.model_type.unwrap_or(ModelType::Unspecified)
    }
}
