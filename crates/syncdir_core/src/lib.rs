//! # SyncDir Core
//!
//! The hierarchical, versioned item store that the sync engine reconciles.
//!
//! This crate provides:
//! - `Id`, the client-local / server-assigned identifier
//! - `EntryKernel`, one item with its visible and server-shadow fields
//! - `Directory`, an identifier-indexed arena of entries
//! - Read and write transactions over the directory
//!
//! ## Key Invariants
//!
//! - Identifiers are unique within a directory
//! - Only one write transaction is open at a time
//! - Readers observe either the fully pre- or fully post-commit state
//! - A write transaction that is not committed leaves no trace

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod directory;
mod entry;
mod error;
mod transaction;
mod types;

pub use directory::Directory;
pub use entry::{EntryKernel, Id};
pub use error::{CoreError, CoreResult};
pub use transaction::{EntryReader, ReadTransaction, WriteTransaction};
pub use types::{MetaHandle, TransactionId, Writer};
