//! 32-byte account addresses.

use std::fmt;

/// Address length in bytes.
pub const ADDRESS_LEN: usize = 32;

/// Fixed-size 32-byte address identifying an account.
///
/// An address is exactly the x-only public key bytes of the account's
/// Schnorr key pair, so a verifying key can be recovered from it directly
/// (see [`crate::crypto::PublicKey::from_address`]).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// Creates an address from a 32-byte slice, `None` on any other length.
    pub fn from_slice(data: &[u8]) -> Option<Address> {
        let arr: [u8; ADDRESS_LEN] = data.try_into().ok()?;
        Some(Address(arr))
    }

    /// Returns the address as a byte slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_requires_exact_length() {
        assert!(Address::from_slice(&[1u8; 20]).is_none());
        assert_eq!(Address::from_slice(&[1u8; 32]), Some(Address([1u8; 32])));
    }
}
