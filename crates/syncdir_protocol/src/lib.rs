//! # SyncDir Protocol
//!
//! Commit protocol types and CBOR codecs for SyncDir.
//!
//! This crate provides:
//! - `SyncEntity`, the per-item body of an outgoing commit
//! - `EntryResponse` and `ResponseType`, the server's per-item verdict
//! - Envelope messages (`ClientToServerMessage`, `ClientToServerResponse`)
//! - `ModelType` and opaque `EntitySpecifics` payloads
//! - CBOR encoding/decoding
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod error;
mod messages;
mod response;
mod specifics;

pub use codec::{from_cbor, to_cbor};
pub use error::{ProtocolError, ProtocolResult};
pub use messages::{
    ClientToServerMessage, CommitMessage, ExtensionActivityRecord, SyncEntity, PROTOCOL_VERSION,
};
pub use response::{ClientToServerResponse, CommitResponse, EntryResponse, ResponseType};
pub use specifics::{EntitySpecifics, ModelType};
