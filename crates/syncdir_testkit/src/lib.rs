//! # SyncDir Testkit
//!
//! Test utilities for SyncDir.
//!
//! This crate provides:
//! - Directory fixtures and commit request/response builders
//! - Property-based test generators using proptest
//! - Test logging setup
//!
//! ## Usage
//!
//! ```rust,ignore
//! use syncdir_testkit::prelude::*;
//!
//! #[test]
//! fn commit_round_trip() {
//!     let folder = client_folder(&Id::root(), "Folder");
//!     let dir = DirectoryBuilder::new().entry(folder.clone()).build();
//!     let commit = CommitBuilder::new(&dir)
//!         .item(folder.id(), ModelType::Bookmarks)
//!         .build();
//!     // ... process a response for `commit`
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod logging;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::logging::*;
    pub use syncdir_core::{Directory, EntryKernel, EntryReader, Id, Writer};
    pub use syncdir_protocol::{EntryResponse, ModelType, ResponseType};
}

pub use fixtures::*;
pub use generators::*;
pub use logging::*;
