//! Blocks and their cached-encoding extension.

use crate::codec::cbor;
use crate::codec::reader::{CborRead, IoReader, SliceReader};
use crate::codec::{Encode, EncodeSink};
use crate::error::{Error, Result};
use crate::model::header::{BlockHeader, BlockHeaderExt};
use crate::model::transaction::{
    decode_transaction_ext_list, encode_transaction_list, write_transaction_ext_list, Transaction,
    TransactionExt,
};
use crate::model::APPROX_EXT_OVERHEAD;
use crate::types::bytes::Bytes;
use crate::types::hash::Hash;
use std::io::{Read, Write};
use std::ops::Deref;
use std::sync::OnceLock;

/// Number of encoded Block fields: header and transaction list.
pub const BLOCK_FIELDS: u64 = 2;

/// Initial byte of an encoded Block: array head for 2 fields.
pub const BLOCK_INITIAL: u8 = 0x80 | BLOCK_FIELDS as u8;

/// A block: header plus the transactions it commits to.
///
/// The encoding writes the transaction list as the null item when empty, so
/// an empty block and a block whose list merely has no entries are the same
/// value on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Block {
    /// The block header.
    pub header: BlockHeader,
    /// The block's transactions, in commitment order.
    pub txs: Vec<Transaction>,
}

impl Block {
    /// Decodes a block from a buffer, requiring all bytes to be consumed.
    ///
    /// Builds the plain value through [`BlockExt`] decoding and discards the
    /// extension layers.
    pub fn from_bytes(buf: &Bytes) -> Result<Self> {
        let ext = BlockExt::from_bytes(buf)?;
        Ok(ext.raw().clone())
    }
}

impl Encode for Block {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        cbor::write_array_head(out, BLOCK_FIELDS);
        self.header.encode(out);
        encode_transaction_list(&self.txs, out);
    }
}

/// A [`Block`] whose header and transactions each carry their exact
/// canonical bytes and content hash.
///
/// The plain [`Block`] view is materialized lazily; blocks are usually
/// relayed and stored by their cached bytes without ever needing it.
#[derive(Debug)]
pub struct BlockExt {
    header: BlockHeaderExt,
    txs: Vec<TransactionExt>,
    block: OnceLock<Block>,
}

impl BlockExt {
    /// Extends a block: encodes and hashes the header and every transaction.
    pub fn extend(block: Block) -> Self {
        Self {
            header: BlockHeaderExt::extend(block.header.clone()),
            txs: block
                .txs
                .iter()
                .map(|tx| TransactionExt::extend(tx.clone()))
                .collect(),
            block: OnceLock::from(block),
        }
    }

    /// Assembles a block extension from already-extended parts.
    ///
    /// Callers are responsible for the header actually committing to `txs`;
    /// this layer does not check `tx_root`.
    pub fn new(header: BlockHeaderExt, txs: Vec<TransactionExt>) -> Self {
        Self {
            header,
            txs,
            block: OnceLock::new(),
        }
    }

    /// Decodes a block extension from `buf`, requiring all bytes to be
    /// consumed. Header and transaction bytes alias `buf`.
    pub fn from_bytes(buf: &Bytes) -> Result<Self> {
        let mut r = SliceReader::new(buf);
        let ext = Self::decode(&mut r)?;
        if r.remaining() != 0 {
            return Err(Error::InvalidEncoding {
                at: r.pos(),
                what: "trailing bytes",
            });
        }
        Ok(ext)
    }

    /// Decodes one block extension from a stream, returning it together with
    /// the number of bytes read. The stream is left positioned at the next
    /// item, so calls can be chained to walk a block sequence.
    pub fn read_from<R: Read>(reader: R) -> Result<(Self, usize)> {
        let mut r = IoReader::new(reader);
        let ext = Self::decode(&mut r)?;
        let read = r.pos();
        Ok((ext, read))
    }

    fn decode<R: CborRead>(r: &mut R) -> Result<Self> {
        cbor::expect_array(r, BLOCK_FIELDS)?;
        let header = BlockHeaderExt::decode(r)?;
        let txs = decode_transaction_ext_list(r)?;
        Ok(Self {
            header,
            txs,
            block: OnceLock::new(),
        })
    }

    /// Decodes only the header extension out of full block bytes, skipping
    /// the transaction list entirely.
    pub fn header_ext_from_block_bytes(buf: &Bytes) -> Result<BlockHeaderExt> {
        let mut r = SliceReader::new(buf);
        cbor::expect_array(&mut r, BLOCK_FIELDS)?;
        BlockHeaderExt::decode(&mut r)
    }

    /// The extended header.
    pub fn header(&self) -> &BlockHeaderExt {
        &self.header
    }

    /// The extended transactions, in commitment order.
    pub fn txs(&self) -> &[TransactionExt] {
        &self.txs
    }

    /// The block hash: the content hash of the header bytes.
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// The plain block value, materialized on first access.
    ///
    /// Cloning out of the extensions is cheap: the byte payloads inside the
    /// header and transactions are reference-counted views.
    pub fn raw(&self) -> &Block {
        self.block.get_or_init(|| Block {
            header: self.header.header().clone(),
            txs: self
                .txs
                .iter()
                .map(|txx| txx.transaction().clone())
                .collect(),
        })
    }

    /// Writes the canonical block encoding to `w`, returning the number of
    /// bytes written.
    ///
    /// Header and transaction bytes are emitted verbatim from the caches;
    /// only the two enclosing heads are produced here. The output is
    /// byte-identical to encoding [`Self::raw`].
    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<usize> {
        w.write_all(&[BLOCK_INITIAL])?;
        w.write_all(self.header.bytes())?;
        let mut written = 1 + self.header.bytes().len();
        written += write_transaction_ext_list(&self.txs, w)?;
        Ok(written)
    }

    /// The canonical block encoding as an owned buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut out = Vec::with_capacity(self.approx_size() as usize);
        // Writing to a Vec cannot fail.
        let _ = self.write_to(&mut out);
        Bytes::from_vec(out)
    }

    /// Approximate resident size in bytes.
    pub fn approx_size(&self) -> u64 {
        APPROX_EXT_OVERHEAD
            + self.header.approx_size()
            + self.txs.iter().map(|txx| txx.approx_size()).sum::<u64>()
    }
}

impl Deref for BlockExt {
    type Target = BlockHeaderExt;
    fn deref(&self) -> &Self::Target {
        &self.header
    }
}

impl PartialEq for BlockExt {
    fn eq(&self, other: &Self) -> bool {
        // The lazily materialized plain view never participates.
        self.header == other.header && self.txs == other.txs
    }
}

impl Eq for BlockExt {}
