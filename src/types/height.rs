//! Block height and its fixed-width storage key encoding.

use std::fmt;

/// Block index in the chain (genesis = 0).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockHeight(pub u64);

/// Length of a block-height storage key in bytes.
pub const HEIGHT_KEY_LEN: usize = 8;

impl BlockHeight {
    /// Encodes the height as a fixed 8-byte big-endian key.
    ///
    /// Big-endian keeps lexicographic key order equal to numeric height
    /// order, so heights can be used directly as sorted lookup keys.
    pub fn to_key(self) -> [u8; HEIGHT_KEY_LEN] {
        self.0.to_be_bytes()
    }

    /// Decodes a height from its big-endian key form.
    pub fn from_key(key: [u8; HEIGHT_KEY_LEN]) -> BlockHeight {
        BlockHeight(u64::from_be_bytes(key))
    }
}

impl From<u64> for BlockHeight {
    fn from(h: u64) -> Self {
        BlockHeight(h)
    }
}

impl fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_roundtrip() {
        for h in [0u64, 1, 255, 256, u64::MAX] {
            let height = BlockHeight(h);
            assert_eq!(BlockHeight::from_key(height.to_key()), height);
        }
    }

    #[test]
    fn key_order_matches_numeric_order() {
        let heights = [0u64, 1, 2, 255, 256, 1 << 16, 1 << 32, u64::MAX];
        let mut keys: Vec<[u8; 8]> = heights.iter().map(|h| BlockHeight(*h).to_key()).collect();
        let sorted = keys.clone();
        keys.sort();
        assert_eq!(keys, sorted);
    }
}
