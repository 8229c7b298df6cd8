//! Shared fixtures for unit tests.

pub mod fixtures {
    use crate::crypto::PrivateKey;
    use crate::model::{Block, BlockHeader, Transaction, TransactionType};
    use crate::types::address::Address;
    use crate::types::bytes::Bytes;
    use crate::types::hash::Hash;
    use crate::types::height::BlockHeight;
    use crate::types::merkle_tree::MerkleTree;

    /// Deterministic signing key used across tests.
    pub fn test_key() -> PrivateKey {
        PrivateKey::from_bytes(&[7u8; 32]).expect("valid test key")
    }

    /// A second deterministic key, for recipient addresses.
    pub fn test_recipient_key() -> PrivateKey {
        PrivateKey::from_bytes(&[8u8; 32]).expect("valid test key")
    }

    pub fn test_to_address() -> Address {
        test_recipient_key().address()
    }

    /// A fully populated, signed transaction with fixed field values.
    pub fn test_transaction() -> Transaction {
        let key = test_key();
        let mut tx = Transaction {
            tx_type: TransactionType(4),
            from: key.address(),
            nonce: 52,
            to: Some(test_to_address()),
            data: Bytes::new(vec![0x04, 0x13, 0x52]),
            extra: Bytes::new(vec![0x21, 0x09, 0x09]),
            sig: None,
        };
        tx.sign(&key);
        tx
    }

    /// A fully populated, signed block header committing to two copies of
    /// [`test_transaction`].
    pub fn test_header() -> BlockHeader {
        let key = test_key();
        let txs = [test_transaction(), test_transaction()];
        let mut header = BlockHeader {
            creator: key.address(),
            time: 1_756_000_000,
            prev_hashes: vec![Hash::digest(b"parent-a"), Hash::digest(b"parent-b")],
            height: BlockHeight(9),
            tx_root: MerkleTree::root_from_transactions(&txs),
            tx_count: txs.len() as u64,
            app_hash: Bytes::new(Hash::digest(b"state").as_slice()),
            extra: Bytes::new(vec![0x01, 0x02]),
            sig: None,
        };
        header.sign(&key);
        header
    }

    /// A block whose header commitment matches its transactions.
    pub fn test_block() -> Block {
        Block {
            header: test_header(),
            txs: vec![test_transaction(), test_transaction()],
        }
    }
}
