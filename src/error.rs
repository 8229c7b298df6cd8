//! Crate-wide error type for decoding and key resolution failures.

/// Errors surfaced by the codec and signature layers.
///
/// Every decode failure carries the number of bytes consumed before the
/// failure was detected, so callers consuming a prefix of a larger buffer or
/// stream can decide whether to resync or reject the payload. A signature
/// that does not verify is *not* an error: verification returns
/// `Ok(false)` in that case, and errors are reserved for "could not even
/// check" conditions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input ended before the expected data was read.
    #[error("unexpected end of input at byte {at}")]
    UnexpectedEof { at: usize },

    /// The bytes do not match the expected structural shape.
    #[error("invalid encoding at byte {at}: {what}")]
    InvalidEncoding { at: usize, what: &'static str },

    /// A length head exceeds the maximum this crate will allocate for.
    #[error("length {len} at byte {at} exceeds limit {max}")]
    LengthOverflow { at: usize, len: u64, max: u64 },

    /// The underlying reader failed while streaming a decode.
    #[error("read failed after {at} bytes")]
    Io {
        at: usize,
        #[source]
        source: std::io::Error,
    },

    /// An address could not be resolved to a valid public key.
    #[error("address does not resolve to a valid public key")]
    KeyResolution,
}

impl Error {
    /// Bytes consumed before the failure, when the error came from a decode.
    pub fn position(&self) -> Option<usize> {
        match self {
            Error::UnexpectedEof { at }
            | Error::InvalidEncoding { at, .. }
            | Error::LengthOverflow { at, .. }
            | Error::Io { at, .. } => Some(*at),
            Error::KeyResolution => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
