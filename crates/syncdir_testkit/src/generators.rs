//! Property-based test generators using proptest.
//!
//! Provides strategies for generating commit batches and server responses
//! that keep the invariants the engine relies on.

use proptest::prelude::*;
use syncdir_protocol::{ModelType, ResponseType};

/// Strategy for generating model types that carry data.
pub fn model_type_strategy() -> impl Strategy<Value = ModelType> {
    prop_oneof![
        Just(ModelType::Bookmarks),
        Just(ModelType::Preferences),
        Just(ModelType::Passwords),
        Just(ModelType::Autofill),
        Just(ModelType::Themes),
        Just(ModelType::TypedUrls),
        Just(ModelType::Extensions),
        Just(ModelType::Sessions),
        Just(ModelType::Apps),
    ]
}

/// Strategy for generating any recognized response type.
pub fn response_type_strategy() -> impl Strategy<Value = ResponseType> {
    prop_oneof![
        Just(ResponseType::Success),
        Just(ResponseType::Conflict),
        Just(ResponseType::Retry),
        Just(ResponseType::InvalidMessage),
        Just(ResponseType::OverQuota),
        Just(ResponseType::TransientError),
    ]
}

/// Strategy for generating non-success response types.
pub fn failure_response_type_strategy() -> impl Strategy<Value = ResponseType> {
    response_type_strategy().prop_filter("must not be success", |t| *t != ResponseType::Success)
}

/// Strategy for generating item names.
pub fn entry_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9 ]{1,16}").expect("Invalid regex")
}

/// Strategy for generating a forest of new items.
///
/// Element `i` is the parent of item `i`: `None` for the root, or
/// `Some(j)` with `j < i` for an earlier item.
pub fn tree_shape_strategy(max_items: usize) -> impl Strategy<Value = Vec<Option<usize>>> {
    (1..=max_items.max(1)).prop_flat_map(|len| {
        (0..len)
            .map(|i| {
                if i == 0 {
                    Just(None).boxed()
                } else {
                    prop::option::of(0..i).boxed()
                }
            })
            .collect::<Vec<_>>()
    })
}

/// Strategy for generating (base version, version bump) pairs of items the
/// server already knows.
pub fn version_pair_strategy() -> impl Strategy<Value = (i64, i64)> {
    (1i64..1_000, 0i64..100)
}

/// Case counts for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
