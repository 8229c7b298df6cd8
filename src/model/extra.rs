//! Capability interface for decoded `extra` payloads.

/// A decoded form of the opaque `extra` metadata carried by transactions and
/// block headers.
///
/// The model layer does not interpret `extra` bytes; applications that do
/// (consensus metadata, encrypted envelopes, ...) implement this trait for
/// their payload type and install instances through
/// [`super::TransactionExt::decode_extra_with`] or
/// [`super::BlockHeaderExt::decode_extra_with`]. Implementations must be
/// thread-safe: a decoded payload is shared by every reader of the owning
/// extension.
pub trait ExtraPayload: std::fmt::Debug + Send + Sync {
    /// Approximate resident size of the decoded payload in bytes.
    ///
    /// Counted into the owning extension's `approx_size`.
    fn approx_size(&self) -> u64;
}
