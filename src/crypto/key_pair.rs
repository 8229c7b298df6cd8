//! Schnorr signature key pairs on secp256k1.

use crate::error::{Error, Result};
use crate::types::address::{Address, ADDRESS_LEN};
use k256::ecdsa::signature::Signer;
use k256::schnorr::signature::Verifier;
use k256::schnorr::{SigningKey, VerifyingKey};
use rand_core::OsRng;

/// Schnorr signature length in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// Private key for signing transactions and block headers.
///
/// Generated with cryptographically secure randomness from the OS. Never
/// serialized by this crate.
#[derive(Clone)]
pub struct PrivateKey {
    key: SigningKey,
}

/// Public key for signature verification.
///
/// The account address is exactly the x-only public key bytes (32 bytes),
/// so addresses and verifying keys convert in both directions without a
/// lookup table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    key: VerifyingKey,
}

/// A 64-byte BIP340 Schnorr signature.
///
/// Wraps the k256 signature type so model code can convert it to and from
/// its fixed 64-byte wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub(crate) k256::schnorr::Signature);

impl PrivateKey {
    /// Generates a new random private key using OS-provided entropy.
    pub fn generate() -> Self {
        let mut rng = OsRng;
        Self {
            key: SigningKey::random(&mut rng),
        }
    }

    /// Creates a private key from raw bytes.
    ///
    /// Returns `None` if the bytes do not represent a valid secp256k1 scalar.
    pub fn from_bytes(bytes: &[u8; 32]) -> Option<Self> {
        SigningKey::from_bytes(bytes).ok().map(|key| Self { key })
    }

    /// Derives the corresponding public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            key: *self.key.verifying_key(),
        }
    }

    /// The address of this key's account.
    pub fn address(&self) -> Address {
        self.public_key().address()
    }

    /// Signs a message, producing a Schnorr signature.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.key.sign(message))
    }
}

impl PublicKey {
    /// Recovers the verifying key from an account address.
    ///
    /// Fails with [`Error::KeyResolution`] when the address bytes are not a
    /// valid x-only point.
    pub fn from_address(address: &Address) -> Result<Self> {
        let key = VerifyingKey::from_bytes(&address.0).map_err(|_| Error::KeyResolution)?;
        Ok(PublicKey { key })
    }

    /// The account address: the x-only public key bytes.
    pub fn address(&self) -> Address {
        let mut addr = [0u8; ADDRESS_LEN];
        addr.copy_from_slice(&self.key.to_bytes());
        Address(addr)
    }

    /// Verifies a Schnorr signature over `message`.
    ///
    /// Returns `true` if the signature is valid, `false` otherwise.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.key.verify(message, &signature.0).is_ok()
    }
}

impl Signature {
    /// The fixed 64-byte wire form of the signature.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        self.0.to_bytes()
    }

    /// Parses a signature from its 64-byte wire form.
    ///
    /// Returns `None` if the bytes are not a structurally valid signature.
    pub fn from_bytes(bytes: &[u8; SIGNATURE_LEN]) -> Option<Self> {
        k256::schnorr::Signature::try_from(bytes.as_slice())
            .ok()
            .map(Signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_roundtrip() {
        let key = PrivateKey::generate();
        let sig = key.sign(b"payload");
        assert!(key.public_key().verify(b"payload", &sig));
        assert!(!key.public_key().verify(b"other payload", &sig));
    }

    #[test]
    fn wrong_key_does_not_verify() {
        let key = PrivateKey::generate();
        let other = PrivateKey::generate();
        let sig = key.sign(b"payload");
        assert!(!other.public_key().verify(b"payload", &sig));
    }

    #[test]
    fn address_resolves_back_to_key() {
        let key = PrivateKey::generate();
        let address = key.address();
        let recovered = PublicKey::from_address(&address).expect("valid address");
        assert_eq!(recovered, key.public_key());
    }

    #[test]
    fn invalid_address_fails_resolution() {
        // The zero point is not on the curve.
        let res = PublicKey::from_address(&Address([0u8; ADDRESS_LEN]));
        assert!(matches!(res, Err(Error::KeyResolution)));
    }

    #[test]
    fn signature_wire_form_roundtrip() {
        let key = PrivateKey::from_bytes(&[7u8; 32]).expect("valid scalar");
        let sig = key.sign(b"wire");
        let bytes = sig.to_bytes();
        assert_eq!(Signature::from_bytes(&bytes), Some(sig));
    }
}
