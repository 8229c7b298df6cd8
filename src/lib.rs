//! Canonical data model and codec for a ledger.
//!
//! Defines the [`model::Transaction`], [`model::BlockHeader`] and
//! [`model::Block`] structures, their deterministic binary encoding, and the
//! derived artifacts built on top of it: content hashes, Merkle roots,
//! signing payloads and signature verification. Extension wrappers
//! ([`model::TransactionExt`], [`model::BlockHeaderExt`], [`model::BlockExt`])
//! cache the canonical bytes and content hash of a value so that hot paths
//! (signature verification, Merkle root computation, block relay) never
//! re-encode or re-hash.

pub mod codec;
pub mod crypto;
pub mod error;
pub mod model;
pub mod types;
pub mod utils;

pub use error::{Error, Result};
