//! 32-byte SHA3-256 content hash with zero-allocation hashing.

use crate::codec::EncodeSink;
use sha3::{Digest, Sha3_256};
use std::fmt;

/// SHA3-256 hash length in bytes.
pub const HASH_LEN: usize = 32;

/// Fixed-size 32-byte content hash used throughout the ledger.
///
/// This type is `Copy` - hashes are passed frequently during verification
/// and Merkle root computation and should live on the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash, Ord, PartialOrd)]
pub struct Hash(pub [u8; HASH_LEN]);

impl Hash {
    /// Creates a zero-valued hash (all bytes 0x00).
    ///
    /// Used as the empty Merkle root and as a sentinel for genesis blocks.
    pub const fn zero() -> Hash {
        Hash([0u8; HASH_LEN])
    }

    /// Hashes `data` in one shot.
    pub fn digest(data: &[u8]) -> Hash {
        Hash(Sha3_256::digest(data).into())
    }

    /// Creates a hash from a 32-byte slice, `None` on any other length.
    pub fn from_slice(data: &[u8]) -> Option<Hash> {
        let arr: [u8; HASH_LEN] = data.try_into().ok()?;
        Some(Hash(arr))
    }

    /// Returns the hash as a byte slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Creates a new SHA3-256 hash builder for incremental hashing.
    ///
    /// The builder implements [`EncodeSink`], so encodable values can be
    /// hashed by encoding directly into it, without an intermediate buffer.
    pub fn sha3() -> HashBuilder {
        HashBuilder::new()
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Incremental SHA3-256 hash builder.
pub struct HashBuilder {
    hasher: Sha3_256,
}

impl HashBuilder {
    /// Creates a new hash builder with empty state.
    pub fn new() -> Self {
        Self {
            hasher: Sha3_256::new(),
        }
    }

    /// Feeds data into the hash computation.
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Consumes the builder and returns the final hash.
    pub fn finalize(self) -> Hash {
        Hash(self.hasher.finalize().into())
    }
}

impl Default for HashBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EncodeSink for HashBuilder {
    fn write(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_matches_incremental() {
        let mut builder = Hash::sha3();
        builder.update(b"he");
        builder.update(b"llo");
        assert_eq!(builder.finalize(), Hash::digest(b"hello"));
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        assert!(Hash::from_slice(&[0u8; 31]).is_none());
        assert!(Hash::from_slice(&[0u8; 33]).is_none());
        assert_eq!(Hash::from_slice(&[7u8; 32]), Some(Hash([7u8; 32])));
    }

    #[test]
    fn display_is_lowercase_hex() {
        let mut bytes = [0u8; HASH_LEN];
        bytes[0] = 0xab;
        bytes[31] = 0x01;
        let s = Hash(bytes).to_string();
        assert_eq!(s.len(), 64);
        assert!(s.starts_with("ab"));
        assert!(s.ends_with("01"));
    }
}
