//! # SyncDir Engine
//!
//! Reconciles the server's answer to a commit with the local directory.
//!
//! This crate provides:
//! - `OrderedCommitSet`, the batch of items sent in one commit
//! - `SyncSession` and `StatusController`, the per-cycle state the engine
//!   reports into (success counters, conflict progress)
//! - `ProcessCommitResponseCommand`, which classifies every response entry,
//!   applies accepted commits and yields one batch-level `SyncerError`
//!
//! ## Architecture
//!
//! Processing runs once per model-safe group. Each group pass opens a single
//! write transaction on the directory and visits the group's items in
//! request order:
//! 1. The syncing flag is cleared
//! 2. The response is classified
//! 3. An accepted item gets its new version and identifier, and children of
//!    a renamed item are re-parented in the same transaction
//!
//! ## Key Invariants
//!
//! - Every item in the batch leaves with its syncing flag cleared
//! - A response whose size does not match the batch changes nothing else
//! - An item edited while its commit was in flight stays unsynced
//! - A corrupted pass is discarded as a whole

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod command;
mod commit_set;
mod config;
mod error;
mod extensions_activity;
mod process_commit_response;
mod reconcile;
mod session;
mod syncer_util;

pub use command::ModelChangingSyncerCommand;
pub use commit_set::{OrderedCommitSet, Projection};
pub use config::{CommitProcessingConfig, ModelSafeGroup, ModelSafeRoutingInfo};
pub use error::{SyncError, SyncResult, SyncerError};
pub use extensions_activity::{ExtensionsActivityMonitor, ExtensionsActivityRecords};
pub use process_commit_response::ProcessCommitResponseCommand;
pub use session::{ConflictProgress, StatusController, SyncSession, SyncerStatus};
pub use syncer_util::{clear_syncing_bits, mark_deleted_children_synced};
