//! Cryptographic capabilities consumed by the model layer.

pub mod key_pair;

pub use key_pair::{PrivateKey, PublicKey, Signature, SIGNATURE_LEN};
