//! Block headers and their cached-encoding extension.

use crate::codec::cbor;
use crate::codec::reader::{CborRead, IoReader, SliceReader};
use crate::codec::{Encode, EncodeSink, MAX_ARRAY_LEN};
use crate::crypto::{PrivateKey, PublicKey, Signature, SIGNATURE_LEN};
use crate::error::{Error, Result};
use crate::model::extra::ExtraPayload;
use crate::model::transaction::{decode_signature, encode_signature};
use crate::model::{spliced_signing_payload, APPROX_EXT_OVERHEAD, APPROX_VALUE_OVERHEAD};
use crate::types::address::{Address, ADDRESS_LEN};
use crate::types::bytes::Bytes;
use crate::types::hash::{Hash, HASH_LEN};
use crate::types::height::BlockHeight;
use std::io::Read;
use std::ops::Deref;
use std::sync::OnceLock;

/// Number of encoded BlockHeader fields.
pub const BLOCK_HEADER_FIELDS: u64 = 9;

/// Initial byte of an encoded BlockHeader: array head for 9 fields.
pub const BLOCK_HEADER_INITIAL: u8 = 0x80 | BLOCK_HEADER_FIELDS as u8;

/// A block header.
///
/// Commits to the block's transactions through `tx_root` and `tx_count`
/// rather than containing them; the block body carries the transactions.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct BlockHeader {
    /// Address of the validator that created the block.
    pub creator: Address,
    /// Creation time, UNIX seconds.
    pub time: u64,
    /// Hashes of the immediate predecessor blocks. More than one entry
    /// means a merge of concurrent branches; order is part of identity.
    pub prev_hashes: Vec<Hash>,
    /// Height of the block in the chain.
    pub height: BlockHeight,
    /// Merkle root over the block's transaction hashes.
    pub tx_root: Hash,
    /// Number of transactions committed by `tx_root`.
    pub tx_count: u64,
    /// Application state hash after executing the block, absent when empty.
    pub app_hash: Bytes,
    /// Extra metadata, opaque at this layer.
    pub extra: Bytes,
    /// Creator's signature over the signing payload.
    pub sig: Option<Signature>,
}

impl BlockHeader {
    fn encode_sans_sig<S: EncodeSink>(&self, out: &mut S) {
        cbor::write_array_head(out, BLOCK_HEADER_FIELDS);
        cbor::write_bytes(out, &self.creator.0);
        cbor::write_uint(out, self.time);
        cbor::write_array_head(out, self.prev_hashes.len() as u64);
        for hash in &self.prev_hashes {
            cbor::write_bytes(out, hash.as_slice());
        }
        cbor::write_uint(out, self.height.0);
        cbor::write_bytes(out, self.tx_root.as_slice());
        cbor::write_uint(out, self.tx_count);
        cbor::write_bytes(out, &self.app_hash);
        cbor::write_bytes(out, &self.extra);
    }

    /// The canonical bytes that are signed: the full encoding with the
    /// signature field in its absent shape.
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_sans_sig(&mut out);
        out.push(cbor::EMPTY_BYTES);
        out
    }

    /// Signs the header with `key`, replacing any existing signature.
    pub fn sign(&mut self, key: &PrivateKey) {
        self.sig = Some(key.sign(&self.signing_payload()));
    }

    /// Verifies the header signature against the `creator` address.
    ///
    /// Returns `Ok(false)` when the signature is absent or does not verify;
    /// fails only when `creator` cannot be resolved to a public key.
    pub fn verify(&self) -> Result<bool> {
        let Some(sig) = &self.sig else {
            return Ok(false);
        };
        let key = PublicKey::from_address(&self.creator)?;
        Ok(key.verify(&self.signing_payload(), sig))
    }

    /// Content hash of the canonical encoding.
    pub fn content_hash(&self) -> Hash {
        let mut h = Hash::sha3();
        self.encode(&mut h);
        h.finalize()
    }

    /// Approximate resident size in bytes.
    pub fn approx_size(&self) -> u64 {
        APPROX_VALUE_OVERHEAD
            + ADDRESS_LEN as u64
            + (self.prev_hashes.len() * HASH_LEN) as u64
            + HASH_LEN as u64
            + self.app_hash.len() as u64
            + self.extra.len() as u64
            + self.sig.map_or(0, |_| SIGNATURE_LEN as u64)
    }

    pub(crate) fn decode<R: CborRead>(r: &mut R) -> Result<Self> {
        cbor::expect_array(r, BLOCK_HEADER_FIELDS)?;

        let creator = Address(cbor::read_fixed_bytes::<_, ADDRESS_LEN>(r)?);
        let time = cbor::read_uint(r)?;

        let at = r.pos();
        let head = cbor::read_head(r)?;
        if head.major != cbor::MAJOR_ARRAY {
            return Err(Error::InvalidEncoding {
                at,
                what: "expected previous-hash list",
            });
        }
        if head.arg > MAX_ARRAY_LEN {
            return Err(Error::LengthOverflow {
                at,
                len: head.arg,
                max: MAX_ARRAY_LEN,
            });
        }
        let mut prev_hashes = Vec::with_capacity(head.arg as usize);
        for _ in 0..head.arg {
            prev_hashes.push(Hash(cbor::read_fixed_bytes::<_, HASH_LEN>(r)?));
        }

        let height = BlockHeight(cbor::read_uint(r)?);
        let tx_root = Hash(cbor::read_fixed_bytes::<_, HASH_LEN>(r)?);
        let tx_count = cbor::read_uint(r)?;
        let app_hash = cbor::read_payload(r)?;
        let extra = cbor::read_payload(r)?;
        let sig = decode_signature(r)?;

        Ok(BlockHeader {
            creator,
            time,
            prev_hashes,
            height,
            tx_root,
            tx_count,
            app_hash,
            extra,
            sig,
        })
    }

    /// Decodes a header from a buffer, requiring all bytes to be consumed.
    pub fn from_bytes(buf: &Bytes) -> Result<Self> {
        let mut r = SliceReader::new(buf);
        let header = Self::decode(&mut r)?;
        if r.remaining() != 0 {
            return Err(Error::InvalidEncoding {
                at: r.pos(),
                what: "trailing bytes",
            });
        }
        Ok(header)
    }
}

impl Encode for BlockHeader {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.encode_sans_sig(out);
        encode_signature(&self.sig, out);
    }
}

/// A [`BlockHeader`] bundled with its exact canonical bytes and content
/// hash. The hash is the block's identity on the wire and in storage.
#[derive(Debug)]
pub struct BlockHeaderExt {
    header: BlockHeader,
    bytes: Bytes,
    hash: Hash,
    extra_decoded: OnceLock<Box<dyn ExtraPayload>>,
}

impl BlockHeaderExt {
    /// Extends a header: encodes it and hashes the encoding.
    pub fn extend(header: BlockHeader) -> Self {
        let bytes = header.to_bytes();
        let hash = Hash::digest(&bytes);
        Self {
            header,
            bytes,
            hash,
            extra_decoded: OnceLock::new(),
        }
    }

    /// Decodes an extension from the front of `buf`, returning it together
    /// with the number of bytes consumed. The cached bytes alias `buf`.
    pub fn from_bytes(buf: &Bytes) -> Result<(Self, usize)> {
        let mut r = SliceReader::new(buf);
        let ext = Self::decode(&mut r)?;
        Ok((ext, r.pos()))
    }

    /// Streaming counterpart of [`Self::from_bytes`].
    pub fn from_reader<R: Read>(reader: R) -> Result<(Self, usize)> {
        let mut r = IoReader::new(reader);
        let ext = Self::decode(&mut r)?;
        let read = r.pos();
        Ok((ext, read))
    }

    pub(crate) fn decode<R: CborRead>(r: &mut R) -> Result<Self> {
        let start = r.pos();
        let header = BlockHeader::decode(r)?;
        let bytes = r.taken(start);
        let hash = Hash::digest(&bytes);
        Ok(Self {
            header,
            bytes,
            hash,
            extra_decoded: OnceLock::new(),
        })
    }

    /// The wrapped header.
    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    /// The exact canonical encoding of the wrapped header.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// The content hash of [`Self::bytes`], i.e. the block hash.
    pub fn hash(&self) -> Hash {
        self.hash
    }

    /// The signing payload, derived by splicing the cached bytes.
    pub fn signing_payload(&self) -> Result<Vec<u8>> {
        spliced_signing_payload(&self.bytes, self.header.sig.is_some())
    }

    /// Verifies the header signature using the cached bytes.
    pub fn verify(&self) -> Result<bool> {
        let Some(sig) = &self.header.sig else {
            return Ok(false);
        };
        let key = PublicKey::from_address(&self.header.creator)?;
        Ok(key.verify(&self.signing_payload()?, sig))
    }

    /// The decoded `extra` payload, if one has been installed.
    pub fn extra_decoded(&self) -> Option<&dyn ExtraPayload> {
        self.extra_decoded.get().map(|boxed| &**boxed)
    }

    /// Decodes the opaque `extra` bytes through `decode`, caching the result.
    /// The first successful call wins.
    pub fn decode_extra_with<F>(&self, decode: F) -> Result<&dyn ExtraPayload>
    where
        F: FnOnce(&[u8]) -> Result<Box<dyn ExtraPayload>>,
    {
        if let Some(existing) = self.extra_decoded.get() {
            return Ok(&**existing);
        }
        let decoded = decode(&self.header.extra)?;
        Ok(&**self.extra_decoded.get_or_init(|| decoded))
    }

    /// Approximate resident size in bytes.
    pub fn approx_size(&self) -> u64 {
        APPROX_EXT_OVERHEAD
            + self.header.approx_size()
            + self.bytes.len() as u64
            + HASH_LEN as u64
            + self.extra_decoded().map_or(0, |extra| extra.approx_size())
    }
}

impl Deref for BlockHeaderExt {
    type Target = BlockHeader;
    fn deref(&self) -> &Self::Target {
        &self.header
    }
}

impl PartialEq for BlockHeaderExt {
    fn eq(&self, other: &Self) -> bool {
        // The lazily decoded extra payload never participates.
        self.header == other.header && self.bytes == other.bytes && self.hash == other.hash
    }
}

impl Eq for BlockHeaderExt {}
