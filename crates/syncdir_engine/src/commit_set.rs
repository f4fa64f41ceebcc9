//! The ordered set of items sent in one commit.

use crate::config::{ModelSafeGroup, ModelSafeRoutingInfo};
use std::collections::{BTreeSet, HashSet};
use syncdir_core::Id;
use syncdir_protocol::ModelType;

/// Batch indices belonging to one model-safe group, in request order.
///
/// Response entry `i` of the batch is correlated with request entry `i`;
/// a projection selects which of those positions a group pass visits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection(Vec<usize>);

impl Projection {
    /// Creates a projection over every index below `len`.
    pub fn all(len: usize) -> Self {
        Self((0..len).collect())
    }

    /// Returns the batch indices.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Returns the number of indices.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no index is selected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the batch indices.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

/// Ordered (pre-commit identifier, model type) pairs of one commit.
///
/// The position of an item is its index in both the outgoing commit
/// message and the expected response. The set holds no routing of its own;
/// groups and projections are always derived from the routing passed in, so
/// every index lands in exactly one group's projection.
#[derive(Debug, Clone, Default)]
pub struct OrderedCommitSet {
    inserted: HashSet<Id>,
    commit_ids: Vec<Id>,
    types: Vec<ModelType>,
}

impl OrderedCommitSet {
    /// Creates an empty commit set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item. Returns false if `id` is already in the set.
    pub fn add_commit_item(&mut self, id: Id, model_type: ModelType) -> bool {
        if !self.inserted.insert(id.clone()) {
            return false;
        }
        self.commit_ids.push(id);
        self.types.push(model_type);
        true
    }

    /// Returns true if `id` is in the set.
    pub fn have_commit_item(&self, id: &Id) -> bool {
        self.inserted.contains(id)
    }

    /// Returns the pre-commit identifier at `index`.
    pub fn commit_id_at(&self, index: usize) -> Option<&Id> {
        self.commit_ids.get(index)
    }

    /// Returns the model type at `index`.
    pub fn model_type_at(&self, index: usize) -> Option<ModelType> {
        self.types.get(index).copied()
    }

    /// Returns every pre-commit identifier, in order.
    pub fn all_commit_ids(&self) -> &[Id] {
        &self.commit_ids
    }

    /// Returns every model type, in order.
    pub fn types(&self) -> &[ModelType] {
        &self.types
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.commit_ids.len()
    }

    /// Returns true if the set has no items.
    pub fn is_empty(&self) -> bool {
        self.commit_ids.is_empty()
    }

    /// Returns true if any item is of `bookmark_type`.
    pub fn has_bookmark_commit_id(&self, bookmark_type: ModelType) -> bool {
        self.types.contains(&bookmark_type)
    }

    /// Returns the groups that own at least one item under `routing`.
    pub fn groups(&self, routing: &ModelSafeRoutingInfo) -> BTreeSet<ModelSafeGroup> {
        routing.groups_for(self.types.iter().copied())
    }

    /// Returns the indices `routing` assigns to `group`.
    pub fn projection(
        &self,
        routing: &ModelSafeRoutingInfo,
        group: ModelSafeGroup,
    ) -> Projection {
        Projection(
            self.types
                .iter()
                .enumerate()
                .filter(|(_, model_type)| routing.group_for(**model_type) == group)
                .map(|(index, _)| index)
                .collect(),
        )
    }

    /// Returns true if the projections of `groups` together cover every
    /// index exactly once.
    pub fn is_covered_by(
        &self,
        routing: &ModelSafeRoutingInfo,
        groups: &BTreeSet<ModelSafeGroup>,
    ) -> bool {
        let mut seen = vec![false; self.len()];
        for group in groups {
            for index in self.projection(routing, *group).iter() {
                if std::mem::replace(&mut seen[index], true) {
                    return false;
                }
            }
        }
        seen.into_iter().all(|visited| visited)
    }
}
