//! Ledger data model: transactions, block headers, blocks, and their
//! extension wrappers.
//!
//! # Wire format
//!
//! Every type encodes as a fixed-order array in the canonical CBOR subset
//! (see [`crate::codec`]); the signature field is always last so the signing
//! payload can be derived from cached bytes by splicing:
//!
//! - `Transaction` = array(7): type, from, nonce, to, data, extra, sig.
//!   Initial byte [`transaction::TRANSACTION_INITIAL`].
//! - `BlockHeader` = array(9): creator, time, prev_hashes, height, tx_root,
//!   tx_count, app_hash, extra, sig. Initial byte
//!   [`header::BLOCK_HEADER_INITIAL`].
//! - `Block` = array(2): header, transaction list. The list is the explicit
//!   null marker when empty, otherwise an array of transaction encodings.
//!   Initial byte [`block::BLOCK_INITIAL`].
//!
//! Optional byte fields (`to`, `data`, `extra`, `app_hash`, `sig`) encode
//! their absent state as the empty byte string `0x40`, never as null; null
//! is reserved for the empty transaction list. This keeps every optional
//! field's absent shape a fixed single byte, which is what makes in-place
//! signature stripping possible.

pub mod block;
pub mod extra;
pub mod header;
pub mod transaction;

pub use block::{Block, BlockExt, BLOCK_INITIAL};
pub use extra::ExtraPayload;
pub use header::{BlockHeader, BlockHeaderExt, BLOCK_HEADER_INITIAL};
pub use transaction::{
    transaction_exts_from_bytes, PartialDecode, Transaction, TransactionExt, TransactionType,
    TRANSACTION_INITIAL,
};

use crate::codec::cbor;
use crate::crypto::SIGNATURE_LEN;
use crate::error::{Error, Result};
use crate::types::bytes::Bytes;

/// Encoded length of the head of a present signature field: `0x58 0x40`.
///
/// Two bytes because 64 exceeds the largest direct head argument (23). If a
/// future signature scheme changes [`SIGNATURE_LEN`], this pair of constants
/// is the single configuration point for the splice below.
pub const SIG_HEAD_ENC_LEN: usize = 2;

/// Encoded length of the signature payload itself.
pub const SIG_DATA_ENC_LEN: usize = SIGNATURE_LEN;

/// Total encoded footprint of a present signature field.
pub const SIG_PRESENT_ENC_LEN: usize = SIG_HEAD_ENC_LEN + SIG_DATA_ENC_LEN;

/// Fixed per-instance overhead charged by `approx_size` for a plain value.
///
/// Stands in for struct bookkeeping (discriminants, lengths, padding)
/// without inspecting the runtime memory layout.
pub const APPROX_VALUE_OVERHEAD: u64 = 48;

/// Fixed per-instance overhead charged by `approx_size` for an extension.
pub const APPROX_EXT_OVERHEAD: u64 = 64;

/// Derives the signing payload from a value's cached canonical bytes.
///
/// When the value carries a signature, the cached bytes end in the fixed
/// present-signature footprint: drop it and append the absent marker. When
/// it does not, the cached bytes already end in the absent shape and are the
/// signing payload as-is. Byte-for-byte equal to re-encoding the value with
/// its signature cleared.
pub(crate) fn spliced_signing_payload(bytes: &Bytes, has_sig: bool) -> Result<Vec<u8>> {
    if !has_sig {
        return Ok(bytes.to_vec());
    }
    if bytes.len() <= SIG_PRESENT_ENC_LEN {
        return Err(Error::InvalidEncoding {
            at: bytes.len(),
            what: "cached bytes shorter than signature footprint",
        });
    }
    let prefix = bytes.len() - SIG_PRESENT_ENC_LEN;
    let mut out = Vec::with_capacity(prefix + 1);
    out.extend_from_slice(&bytes[..prefix]);
    out.push(cbor::EMPTY_BYTES);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splice_without_signature_is_identity() {
        let bytes = Bytes::new(vec![0x87, 0x04, 0x40]);
        let payload = spliced_signing_payload(&bytes, false).unwrap();
        assert_eq!(payload, bytes.to_vec());
    }

    #[test]
    fn splice_replaces_signature_with_absent_marker() {
        let mut encoded = vec![0x87, 0x04, 0x58, 0x40];
        encoded.extend_from_slice(&[0xaa; 64]);
        let payload = spliced_signing_payload(&Bytes::new(encoded), true).unwrap();
        assert_eq!(payload, vec![0x87, 0x04, 0x40]);
    }

    #[test]
    fn splice_guards_short_buffers() {
        let bytes = Bytes::new(vec![0u8; SIG_PRESENT_ENC_LEN]);
        let res = spliced_signing_payload(&bytes, true);
        assert!(matches!(res, Err(Error::InvalidEncoding { .. })));
    }
}
