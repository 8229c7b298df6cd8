//! Reference-counted, immutable byte buffer with zero-copy sub-ranges.

use std::fmt;
use std::ops::{Deref, Range};
use std::sync::Arc;

/// An immutable, reference-counted view into a byte buffer.
///
/// Cloning and sub-slicing are O(1): both share the same backing allocation
/// and only adjust the view bounds. This is what lets a decoded extension
/// alias the exact sub-range of the buffer it was parsed from without copying
/// and without any aliasing hazard, since no API mutates the backing storage
/// after construction.
#[derive(Clone, Default)]
pub struct Bytes {
    data: Arc<[u8]>,
    start: usize,
    end: usize,
}

impl Bytes {
    /// Creates a new buffer owning a copy of `data`.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self::from_vec(data.into())
    }

    /// Creates a new buffer taking ownership of an existing `Vec<u8>`.
    pub fn from_vec(v: Vec<u8>) -> Self {
        let end = v.len();
        Self {
            data: Arc::from(v),
            start: 0,
            end,
        }
    }

    /// Returns the number of bytes in this view.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` if this view is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the view contents as a byte slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.start..self.end]
    }

    /// Copies the view contents into a new `Vec<u8>`.
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }

    /// Returns a sub-view of `range` within this view, sharing the backing
    /// allocation.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds, matching slice indexing.
    pub fn slice(&self, range: Range<usize>) -> Bytes {
        assert!(
            range.start <= range.end && range.end <= self.len(),
            "range {}..{} out of bounds for Bytes of length {}",
            range.start,
            range.end,
            self.len()
        );
        Bytes {
            data: Arc::clone(&self.data),
            start: self.start + range.start,
            end: self.start + range.end,
        }
    }
}

impl Deref for Bytes {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl PartialEq for Bytes {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Bytes {}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes[{}](", self.len())?;
        for byte in self.as_slice().iter().take(32) {
            write!(f, "{:02x}", byte)?;
        }
        if self.len() > 32 {
            write!(f, "..")?;
        }
        write!(f, ")")
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(v: Vec<u8>) -> Self {
        Self::from_vec(v)
    }
}

impl From<&[u8]> for Bytes {
    fn from(s: &[u8]) -> Self {
        Self::new(s)
    }
}

impl<const N: usize> From<[u8; N]> for Bytes {
    fn from(arr: [u8; N]) -> Self {
        Self::new(arr)
    }
}

impl<const N: usize> From<&[u8; N]> for Bytes {
    fn from(arr: &[u8; N]) -> Self {
        Self::new(arr.as_slice())
    }
}
