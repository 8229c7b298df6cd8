//! Transactions and their cached-encoding extension.

use crate::codec::cbor;
use crate::codec::reader::{CborRead, IoReader, SliceReader};
use crate::codec::{Encode, EncodeSink, MAX_ARRAY_LEN};
use crate::crypto::{PrivateKey, PublicKey, Signature, SIGNATURE_LEN};
use crate::error::{Error, Result};
use crate::model::extra::ExtraPayload;
use crate::model::{
    spliced_signing_payload, APPROX_EXT_OVERHEAD, APPROX_VALUE_OVERHEAD,
};
use crate::types::address::{Address, ADDRESS_LEN};
use crate::types::bytes::Bytes;
use crate::types::hash::{Hash, HASH_LEN};
use crate::warn;
use std::io::Read;
use std::ops::Deref;
use std::sync::OnceLock;

/// Number of encoded Transaction fields.
pub const TRANSACTION_FIELDS: u64 = 7;

/// Initial byte of an encoded Transaction: array head for 7 fields.
pub const TRANSACTION_INITIAL: u8 = 0x80 | TRANSACTION_FIELDS as u8;

/// Transaction type tag (0-255).
///
/// An open set: this layer does not interpret types, it only carries them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TransactionType(pub u8);

/// A ledger transaction.
///
/// Optional byte payloads use [`Bytes`] with absent == empty, matching the
/// canonical encoding rule; `to` and `sig` distinguish absence because their
/// present form has a mandatory fixed length.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Transaction {
    /// Transaction type.
    pub tx_type: TransactionType,
    /// Sender address.
    pub from: Address,
    /// Sender's monotonic replay counter.
    pub nonce: u64,
    /// Target address, absent for self-contained transactions.
    pub to: Option<Address>,
    /// Payload data.
    pub data: Bytes,
    /// Extra metadata, e.g. for an encryption or secret sharing scheme.
    pub extra: Bytes,
    /// Signature over the signing payload. Encoded last, so it can be
    /// stripped or appended without touching the preceding bytes.
    pub sig: Option<Signature>,
}

impl Transaction {
    /// Writes every field except the signature.
    fn encode_sans_sig<S: EncodeSink>(&self, out: &mut S) {
        cbor::write_array_head(out, TRANSACTION_FIELDS);
        cbor::write_uint(out, self.tx_type.0 as u64);
        cbor::write_bytes(out, &self.from.0);
        cbor::write_uint(out, self.nonce);
        match &self.to {
            Some(to) => cbor::write_bytes(out, &to.0),
            None => cbor::write_bytes(out, &[]),
        }
        cbor::write_bytes(out, &self.data);
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

    /// Signs the transaction with `key`, replacing any existing signature.
    pub fn sign(&mut self, key: &PrivateKey) {
        self.sig = Some(key.sign(&self.signing_payload()));
    }

    /// Verifies the transaction signature against the `from` address.
    ///
    /// Returns `Ok(false)` when the signature is absent or does not verify;
    /// fails only when `from` cannot be resolved to a public key. Prefer
    /// [`TransactionExt::verify`] when cached bytes are available.
    pub fn verify(&self) -> Result<bool> {
        let Some(sig) = &self.sig else {
            return Ok(false);
        };
        let key = PublicKey::from_address(&self.from)?;
        Ok(key.verify(&self.signing_payload(), sig))
    }

    /// Content hash of the canonical encoding, computed without an
    /// intermediate buffer.
    pub fn content_hash(&self) -> Hash {
        let mut h = Hash::sha3();
        self.encode(&mut h);
        h.finalize()
    }

    /// Approximate resident size in bytes: variable-length field contents
    /// plus [`APPROX_VALUE_OVERHEAD`].
    pub fn approx_size(&self) -> u64 {
        APPROX_VALUE_OVERHEAD
            + ADDRESS_LEN as u64
            + self.to.map_or(0, |_| ADDRESS_LEN as u64)
            + self.data.len() as u64
            + self.extra.len() as u64
            + self.sig.map_or(0, |_| SIGNATURE_LEN as u64)
    }

    pub(crate) fn decode<R: CborRead>(r: &mut R) -> Result<Self> {
        cbor::expect_array(r, TRANSACTION_FIELDS)?;

        let at = r.pos();
        let tx_type = cbor::read_uint(r)?;
        if tx_type > u8::MAX as u64 {
            return Err(Error::InvalidEncoding {
                at,
                what: "transaction type out of range",
            });
        }
        let from = Address(cbor::read_fixed_bytes::<_, ADDRESS_LEN>(r)?);
        let nonce = cbor::read_uint(r)?;
        let to = cbor::read_optional_fixed_bytes::<_, ADDRESS_LEN>(r)?.map(Address);
        let data = cbor::read_payload(r)?;
        let extra = cbor::read_payload(r)?;
        let sig = decode_signature(r)?;

        Ok(Transaction {
            tx_type: TransactionType(tx_type as u8),
            from,
            nonce,
            to,
            data,
            extra,
            sig,
        })
    }

    /// Decodes a transaction from a buffer, requiring all bytes to be
    /// consumed.
    pub fn from_bytes(buf: &Bytes) -> Result<Self> {
        let mut r = SliceReader::new(buf);
        let tx = Self::decode(&mut r)?;
        if r.remaining() != 0 {
            return Err(Error::InvalidEncoding {
                at: r.pos(),
                what: "trailing bytes",
            });
        }
        Ok(tx)
    }
}

impl Encode for Transaction {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.encode_sans_sig(out);
        encode_signature(&self.sig, out);
    }
}

/// Writes a signature field in its present or absent shape.
pub(crate) fn encode_signature<S: EncodeSink>(sig: &Option<Signature>, out: &mut S) {
    match sig {
        Some(sig) => cbor::write_bytes(out, &sig.to_bytes()),
        None => cbor::write_bytes(out, &[]),
    }
}

/// Reads a signature field: empty byte string (absent) or 64 bytes.
pub(crate) fn decode_signature<R: CborRead>(r: &mut R) -> Result<Option<Signature>> {
    let at = r.pos();
    match cbor::read_optional_fixed_bytes::<_, SIGNATURE_LEN>(r)? {
        Some(raw) => Signature::from_bytes(&raw)
            .map(Some)
            .ok_or(Error::InvalidEncoding {
                at,
                what: "malformed signature",
            }),
        None => Ok(None),
    }
}

/// A [`Transaction`] bundled with its exact canonical bytes and content
/// hash, computed once at construction.
///
/// Immutable after construction: replacing the transaction means building a
/// new extension. Safe to share across threads.
#[derive(Debug)]
pub struct TransactionExt {
    tx: Transaction,
    bytes: Bytes,
    hash: Hash,
    extra_decoded: OnceLock<Box<dyn ExtraPayload>>,
}

impl TransactionExt {
    /// Extends a transaction: encodes it and hashes the encoding.
    pub fn extend(tx: Transaction) -> Self {
        let bytes = tx.to_bytes();
        let hash = Hash::digest(&bytes);
        Self {
            tx,
            bytes,
            hash,
            extra_decoded: OnceLock::new(),
        }
    }

    /// Decodes an extension from the front of `buf`, returning it together
    /// with the number of bytes consumed.
    ///
    /// The extension's cached bytes are a zero-copy sub-range of `buf`;
    /// [`Bytes`] is immutable, so the aliasing is safe.
    pub fn from_bytes(buf: &Bytes) -> Result<(Self, usize)> {
        let mut r = SliceReader::new(buf);
        let ext = Self::decode(&mut r)?;
        Ok((ext, r.pos()))
    }

    /// Streaming counterpart of [`Self::from_bytes`]: decodes one extension
    /// from `reader`, capturing the consumed bytes as it goes.
    pub fn from_reader<R: Read>(reader: R) -> Result<(Self, usize)> {
        let mut r = IoReader::new(reader);
        let ext = Self::decode(&mut r)?;
        let read = r.pos();
        Ok((ext, read))
    }

    pub(crate) fn decode<R: CborRead>(r: &mut R) -> Result<Self> {
        let start = r.pos();
        let tx = Transaction::decode(r)?;
        let bytes = r.taken(start);
        let hash = Hash::digest(&bytes);
        Ok(Self {
            tx,
            bytes,
            hash,
            extra_decoded: OnceLock::new(),
        })
    }

    /// The wrapped transaction.
    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    /// The exact canonical encoding of the wrapped transaction.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// The content hash of [`Self::bytes`].
    pub fn hash(&self) -> Hash {
        self.hash
    }

    /// The signing payload, derived by splicing the cached bytes instead of
    /// re-encoding (see [`spliced_signing_payload`]).
    pub fn signing_payload(&self) -> Result<Vec<u8>> {
        spliced_signing_payload(&self.bytes, self.tx.sig.is_some())
    }

    /// Verifies the transaction signature using the cached bytes.
    ///
    /// Equivalent to [`Transaction::verify`] for any extension whose wrapped
    /// value round-trips through the codec, but skips the re-encode.
    pub fn verify(&self) -> Result<bool> {
        let Some(sig) = &self.tx.sig else {
            return Ok(false);
        };
        let key = PublicKey::from_address(&self.tx.from)?;
        Ok(key.verify(&self.signing_payload()?, sig))
    }

    /// The decoded `extra` payload, if one has been installed.
    pub fn extra_decoded(&self) -> Option<&dyn ExtraPayload> {
        self.extra_decoded.get().map(|boxed| &**boxed)
    }

    /// Decodes the opaque `extra` bytes through `decode`, caching the result.
    ///
    /// The first successful call wins; later calls return the cached payload
    /// without invoking `decode`. Safe under concurrent first access.
    pub fn decode_extra_with<F>(&self, decode: F) -> Result<&dyn ExtraPayload>
    where
        F: FnOnce(&[u8]) -> Result<Box<dyn ExtraPayload>>,
    {
        if let Some(existing) = self.extra_decoded.get() {
            return Ok(&**existing);
        }
        let decoded = decode(&self.tx.extra)?;
        Ok(&**self.extra_decoded.get_or_init(|| decoded))
    }

    /// Approximate resident size: the wrapped transaction, the cached bytes
    /// and hash, any decoded extra payload, plus [`APPROX_EXT_OVERHEAD`].
    pub fn approx_size(&self) -> u64 {
        APPROX_EXT_OVERHEAD
            + self.tx.approx_size()
            + self.bytes.len() as u64
            + HASH_LEN as u64
            + self.extra_decoded().map_or(0, |extra| extra.approx_size())
    }
}

impl Deref for TransactionExt {
    type Target = Transaction;
    fn deref(&self) -> &Self::Target {
        &self.tx
    }
}

impl PartialEq for TransactionExt {
    fn eq(&self, other: &Self) -> bool {
        // The lazily decoded extra payload never participates.
        self.tx == other.tx && self.bytes == other.bytes && self.hash == other.hash
    }
}

impl Eq for TransactionExt {}

/// Writes a transaction list: the null marker when empty, else an array.
pub(crate) fn encode_transaction_list<S: EncodeSink>(txs: &[Transaction], out: &mut S) {
    if txs.is_empty() {
        cbor::write_null(out);
        return;
    }
    cbor::write_array_head(out, txs.len() as u64);
    for tx in txs {
        tx.encode(out);
    }
}

/// Writes a transaction list from extensions, reusing their cached bytes.
pub(crate) fn write_transaction_ext_list<W: std::io::Write>(
    txxs: &[TransactionExt],
    w: &mut W,
) -> std::io::Result<usize> {
    if txxs.is_empty() {
        w.write_all(&[cbor::NULL])?;
        return Ok(1);
    }
    let mut head = Vec::with_capacity(9);
    cbor::write_array_head(&mut head, txxs.len() as u64);
    w.write_all(&head)?;
    let mut written = head.len();
    for txx in txxs {
        w.write_all(txx.bytes())?;
        written += txx.bytes().len();
    }
    Ok(written)
}

/// Decodes a transaction list into extensions, aborting on the first error.
pub(crate) fn decode_transaction_ext_list<R: CborRead>(r: &mut R) -> Result<Vec<TransactionExt>> {
    let at = r.pos();
    let head = cbor::read_head(r)?;
    if head.is_null() {
        return Ok(Vec::new());
    }
    if head.major != cbor::MAJOR_ARRAY {
        return Err(Error::InvalidEncoding {
            at,
            what: "expected transaction list",
        });
    }
    if head.arg > MAX_ARRAY_LEN {
        return Err(Error::LengthOverflow {
            at,
            len: head.arg,
            max: MAX_ARRAY_LEN,
        });
    }
    let mut txxs = Vec::with_capacity(head.arg as usize);
    for _ in 0..head.arg {
        txxs.push(TransactionExt::decode(r)?);
    }
    Ok(txxs)
}

/// A failed batch decode: what was decoded before the failure, how many
/// bytes were consumed, and the error that stopped it.
#[derive(Debug)]
pub struct PartialDecode {
    pub decoded: Vec<TransactionExt>,
    pub consumed: usize,
    pub error: Error,
}

/// Decodes a standalone transaction list (null or array of transactions)
/// into extensions.
///
/// On success returns the extensions and the total bytes consumed. On an
/// element failure it fails fast but hands back the successfully decoded
/// prefix for diagnostics.
pub fn transaction_exts_from_bytes(
    buf: &Bytes,
) -> Result<(Vec<TransactionExt>, usize), PartialDecode> {
    let mut r = SliceReader::new(buf);

    let fail = |decoded, r: &SliceReader, error| PartialDecode {
        decoded,
        consumed: r.pos(),
        error,
    };

    let at = r.pos();
    let head = match cbor::read_head(&mut r) {
        Ok(head) => head,
        Err(error) => return Err(fail(Vec::new(), &r, error)),
    };
    if head.is_null() {
        return Ok((Vec::new(), r.pos()));
    }
    if head.major != cbor::MAJOR_ARRAY {
        let error = Error::InvalidEncoding {
            at,
            what: "expected transaction list",
        };
        return Err(fail(Vec::new(), &r, error));
    }
    if head.arg > MAX_ARRAY_LEN {
        let error = Error::LengthOverflow {
            at,
            len: head.arg,
            max: MAX_ARRAY_LEN,
        };
        return Err(fail(Vec::new(), &r, error));
    }

    let mut txxs = Vec::with_capacity(head.arg as usize);
    for i in 0..head.arg {
        match TransactionExt::decode(&mut r) {
            Ok(txx) => txxs.push(txx),
            Err(error) => {
                warn!(
                    "transaction {} of {} failed to decode: {}",
                    i, head.arg, error
                );
                return Err(fail(txxs, &r, error));
            }
        }
    }
    Ok((txxs, r.pos()))
}
