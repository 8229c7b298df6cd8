//! Canonical codec: deterministic binary encoding and decoding.
//!
//! The wire format is a strict, deterministic subset of CBOR (RFC 8949).
//! Only four kinds of items are ever produced or accepted:
//!
//! - unsigned integers (major type 0), minimal-length heads only;
//! - definite-length byte strings (major type 2);
//! - definite-length arrays (major type 4);
//! - the single byte `0xf6` (null), used exclusively as the explicit
//!   "no transactions" marker inside a block.
//!
//! Minimal-length heads make the encoding canonical: a given value has
//! exactly one byte representation, and decoders reject any other. Field
//! layouts for the model types live next to the types themselves in
//! [`crate::model`]; this module provides the item-level primitives and the
//! two decode sources ([`reader::SliceReader`], [`reader::IoReader`]) that
//! all decoding is written against.

pub mod cbor;
pub mod reader;

use crate::types::bytes::Bytes;

/// Maximum byte-string length accepted by decoders.
///
/// Bounds allocations driven by hostile length heads; well above any
/// legitimate payload this layer carries.
pub const MAX_BYTES_LEN: u64 = 1 << 20;

/// Maximum array element count accepted by decoders.
pub const MAX_ARRAY_LEN: u64 = 65_536;

/// Sink for writing encoded bytes.
///
/// Implemented by byte buffers and by the SHA3 hash builder, so values can
/// be encoded straight into a hasher without an intermediate allocation.
pub trait EncodeSink {
    /// Writes the given bytes to the sink.
    fn write(&mut self, bytes: &[u8]);
}

/// Counter for computing encoded size without allocating memory.
///
/// Used by [`Encode::to_bytes`] to pre-allocate exact capacity.
pub struct SizeCounter {
    len: usize,
}

impl SizeCounter {
    /// Creates a new counter initialized to zero.
    pub fn new() -> Self {
        Self { len: 0 }
    }

    /// Returns the total number of bytes counted.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing has been counted.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for SizeCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl EncodeSink for SizeCounter {
    fn write(&mut self, bytes: &[u8]) {
        self.len += bytes.len();
    }
}

impl EncodeSink for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Trait for values with a canonical binary encoding.
///
/// Encoding is deterministic and total: every in-memory value is
/// representable, so no error path exists on the encode side.
pub trait Encode {
    /// Writes the canonical encoding to the given sink.
    fn encode<S: EncodeSink>(&self, out: &mut S);

    /// Serializes to a new byte buffer with exact capacity.
    ///
    /// Performs two passes: first to count bytes, then to encode.
    fn to_bytes(&self) -> Bytes {
        let mut counter = SizeCounter::new();
        self.encode(&mut counter);

        let mut out = Vec::with_capacity(counter.len());
        self.encode(&mut out);
        Bytes::from_vec(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair;

    impl Encode for Pair {
        fn encode<S: EncodeSink>(&self, out: &mut S) {
            out.write(&[0x01]);
            out.write(&[0x02, 0x03]);
        }
    }

    #[test]
    fn size_counter_accumulates() {
        let mut counter = SizeCounter::new();
        assert!(counter.is_empty());
        counter.write(&[1, 2, 3]);
        counter.write(&[4, 5]);
        assert_eq!(counter.len(), 5);
    }

    #[test]
    fn to_bytes_matches_encode() {
        let bytes = Pair.to_bytes();
        assert_eq!(bytes.as_slice(), &[0x01, 0x02, 0x03]);
    }
}
