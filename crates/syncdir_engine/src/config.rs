//! Configuration for commit processing.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use syncdir_protocol::ModelType;

/// A partition of model types whose entries may be mutated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModelSafeGroup {
    /// Types with no thread affinity. The default for unrouted types.
    Passive,
    /// Types owned by the UI thread.
    Ui,
    /// Types owned by the database thread.
    Db,
    /// Types owned by the file thread.
    File,
    /// Types owned by the history thread.
    History,
    /// Types owned by the password store.
    Password,
}

impl ModelSafeGroup {
    /// Returns a stable name for logging.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passive => "GROUP_PASSIVE",
            Self::Ui => "GROUP_UI",
            Self::Db => "GROUP_DB",
            Self::File => "GROUP_FILE",
            Self::History => "GROUP_HISTORY",
            Self::Password => "GROUP_PASSWORD",
        }
    }
}

impl fmt::Display for ModelSafeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routes model types to model-safe groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelSafeRoutingInfo {
    routes: BTreeMap<ModelType, ModelSafeGroup>,
}

impl ModelSafeRoutingInfo {
    /// Creates an empty routing table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes `model_type` to `group`, replacing any previous route.
    pub fn insert(&mut self, model_type: ModelType, group: ModelSafeGroup) {
        self.routes.insert(model_type, group);
    }

    /// Returns the group for `model_type`; unrouted types are passive.
    pub fn group_for(&self, model_type: ModelType) -> ModelSafeGroup {
        self.routes
            .get(&model_type)
            .copied()
            .unwrap_or(ModelSafeGroup::Passive)
    }

    /// Returns the groups of the given types, deduplicated and ordered.
    pub fn groups_for<I>(&self, types: I) -> BTreeSet<ModelSafeGroup>
    where
        I: IntoIterator<Item = ModelType>,
    {
        types.into_iter().map(|t| self.group_for(t)).collect()
    }
}

/// Configuration for processing commit responses.
///
/// # Example
///
/// ```rust,ignore
/// use syncdir_engine::{CommitProcessingConfig, ModelSafeGroup};
/// use syncdir_protocol::ModelType;
///
/// let config = CommitProcessingConfig::new()
///     .with_route(ModelType::Bookmarks, ModelSafeGroup::Ui)
///     .with_route(ModelType::Passwords, ModelSafeGroup::Password);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitProcessingConfig {
    /// Model type to group routing.
    pub routing: ModelSafeRoutingInfo,
    /// Type counted by the bookmark-specific success counter.
    pub bookmark_type: ModelType,
}

impl CommitProcessingConfig {
    /// Creates a configuration that routes every type to the passive group.
    pub fn new() -> Self {
        Self {
            routing: ModelSafeRoutingInfo::new(),
            bookmark_type: ModelType::Bookmarks,
        }
    }

    /// Routes `model_type` to `group`.
    #[must_use]
    pub fn with_route(mut self, model_type: ModelType, group: ModelSafeGroup) -> Self {
        self.routing.insert(model_type, group);
        self
    }

    /// Sets the routing table.
    #[must_use]
    pub fn with_routing(mut self, routing: ModelSafeRoutingInfo) -> Self {
        self.routing = routing;
        self
    }

    /// Sets the type counted as bookmarks.
    #[must_use]
    pub fn with_bookmark_type(mut self, model_type: ModelType) -> Self {
        self.bookmark_type = model_type;
        self
    }
}

impl Default for CommitProcessingConfig {
    fn default() -> Self {
        Self::new()
    }
}
