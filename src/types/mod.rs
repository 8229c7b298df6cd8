//! Foundational value types shared across the crate.

pub mod address;
pub mod bytes;
pub mod hash;
pub mod height;
pub mod merkle_tree;

pub use address::{Address, ADDRESS_LEN};
pub use bytes::Bytes;
pub use hash::{Hash, HashBuilder, HASH_LEN};
pub use height::{BlockHeight, HEIGHT_KEY_LEN};
pub use merkle_tree::MerkleTree;
