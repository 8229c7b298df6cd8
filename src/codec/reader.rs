//! Decode sources: in-memory slices and byte-capturing streams.
//!
//! All decoding in this crate is written once per type, generic over
//! [`CborRead`]. Two sources implement it:
//!
//! - [`SliceReader`] walks a shared [`Bytes`] buffer; byte-string reads and
//!   consumed-range views are zero-copy sub-slices of that buffer.
//! - [`IoReader`] wraps any [`std::io::Read`] and records every byte it
//!   consumes, so a streaming decode yields the exact raw bytes alongside
//!   the value without a second encode pass.

use crate::error::{Error, Result};
use crate::types::bytes::Bytes;
use std::io::Read;

/// A positioned source of canonical-encoding bytes.
pub trait CborRead {
    /// Number of bytes consumed so far.
    fn pos(&self) -> usize;

    /// Reads a single byte.
    fn read_byte(&mut self) -> Result<u8>;

    /// Reads exactly `N` bytes into a fixed array.
    fn read_fixed<const N: usize>(&mut self) -> Result<[u8; N]>;

    /// Reads exactly `n` bytes.
    ///
    /// Callers must bound `n` (see [`super::MAX_BYTES_LEN`]) before calling.
    fn read_bytes(&mut self, n: usize) -> Result<Bytes>;

    /// Returns the bytes consumed between a prior `pos()` value and now.
    fn taken(&self, from: usize) -> Bytes;
}

/// Cursor over a shared in-memory buffer.
pub struct SliceReader {
    buf: Bytes,
    pos: usize,
}

impl SliceReader {
    /// Creates a reader positioned at the start of `buf`.
    ///
    /// The reader shares `buf`'s backing allocation; everything it hands out
    /// (byte strings, consumed ranges) aliases that allocation.
    pub fn new(buf: &Bytes) -> Self {
        Self {
            buf: buf.clone(),
            pos: 0,
        }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(Error::UnexpectedEof { at: self.pos });
        }
        Ok(())
    }
}

impl CborRead for SliceReader {
    fn pos(&self) -> usize {
        self.pos
    }

    fn read_byte(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(b)
    }

    fn read_fixed<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    fn read_bytes(&mut self, n: usize) -> Result<Bytes> {
        self.ensure(n)?;
        let out = self.buf.slice(self.pos..self.pos + n);
        self.pos += n;
        Ok(out)
    }

    fn taken(&self, from: usize) -> Bytes {
        self.buf.slice(from..self.pos)
    }
}

/// Length of the scratch buffer used for item heads.
///
/// An item head is at most 9 bytes (initial byte plus an 8-byte argument),
/// so single-byte and head reads never touch the heap. The buffer is owned
/// by the reader and reused across calls; it is never exposed to callers.
const HEAD_SCRATCH_LEN: usize = 9;

/// Streaming source that captures every byte it consumes.
///
/// `taken` and byte-string reads copy out of the capture buffer, which is
/// the price of not knowing item lengths up front on a stream. Reads past
/// the end of the stream surface as [`Error::UnexpectedEof`] with the
/// position of the failure.
pub struct IoReader<R> {
    inner: R,
    captured: Vec<u8>,
    scratch: [u8; HEAD_SCRATCH_LEN],
}

impl<R: Read> IoReader<R> {
    /// Creates a capturing reader over `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            captured: Vec::new(),
            scratch: [0u8; HEAD_SCRATCH_LEN],
        }
    }

    /// All bytes consumed since construction.
    pub fn captured(&self) -> &[u8] {
        &self.captured
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        let at = self.captured.len();
        self.inner.read_exact(buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                Error::UnexpectedEof { at }
            } else {
                Error::Io { at, source: e }
            }
        })?;
        self.captured.extend_from_slice(buf);
        Ok(())
    }

    /// Reads `n` bytes through the reusable head scratch buffer.
    fn fill_scratch(&mut self, n: usize) -> Result<&[u8]> {
        debug_assert!(n <= HEAD_SCRATCH_LEN);
        let at = self.captured.len();
        let scratch = &mut self.scratch[..n];
        self.inner.read_exact(scratch).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                Error::UnexpectedEof { at }
            } else {
                Error::Io { at, source: e }
            }
        })?;
        self.captured.extend_from_slice(&self.scratch[..n]);
        Ok(&self.scratch[..n])
    }
}

impl<R: Read> CborRead for IoReader<R> {
    fn pos(&self) -> usize {
        self.captured.len()
    }

    fn read_byte(&mut self) -> Result<u8> {
        Ok(self.fill_scratch(1)?[0])
    }

    fn read_fixed<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        self.fill(&mut out)?;
        Ok(out)
    }

    fn read_bytes(&mut self, n: usize) -> Result<Bytes> {
        let mut out = vec![0u8; n];
        self.fill(&mut out)?;
        Ok(Bytes::from_vec(out))
    }

    fn taken(&self, from: usize) -> Bytes {
        Bytes::new(&self.captured[from..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_reader_tracks_position() {
        let buf = Bytes::new(vec![1u8, 2, 3, 4, 5]);
        let mut r = SliceReader::new(&buf);
        assert_eq!(r.read_byte().unwrap(), 1);
        assert_eq!(r.read_fixed::<2>().unwrap(), [2, 3]);
        assert_eq!(r.pos(), 3);
        assert_eq!(r.remaining(), 2);
    }

    #[test]
    fn slice_reader_taken_is_zero_copy() {
        let buf = Bytes::new(vec![9u8, 8, 7, 6]);
        let mut r = SliceReader::new(&buf);
        r.read_byte().unwrap();
        r.read_byte().unwrap();
        let view = r.taken(0);
        assert_eq!(view.as_slice(), &[9, 8]);
        assert!(std::ptr::eq(&buf.as_slice()[0], &view.as_slice()[0]));
    }

    #[test]
    fn slice_reader_eof_reports_position() {
        let buf = Bytes::new(vec![1u8, 2]);
        let mut r = SliceReader::new(&buf);
        r.read_byte().unwrap();
        match r.read_fixed::<4>() {
            Err(Error::UnexpectedEof { at }) => assert_eq!(at, 1),
            other => panic!("expected eof, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn io_reader_captures_consumed_bytes() {
        let data = [0xaau8, 0xbb, 0xcc, 0xdd];
        let mut r = IoReader::new(&data[..]);
        r.read_byte().unwrap();
        let mid = r.pos();
        r.read_fixed::<2>().unwrap();
        assert_eq!(r.captured(), &[0xaa, 0xbb, 0xcc]);
        assert_eq!(r.taken(mid).as_slice(), &[0xbb, 0xcc]);
    }

    #[test]
    fn io_reader_eof_reports_position() {
        let data = [1u8, 2, 3];
        let mut r = IoReader::new(&data[..]);
        r.read_fixed::<2>().unwrap();
        match r.read_fixed::<2>() {
            Err(Error::UnexpectedEof { at }) => assert_eq!(at, 2),
            other => panic!("expected eof, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn io_reader_stops_at_item_boundary() {
        // Reading a known count of bytes must not consume the rest of the
        // stream, so decodes can be chained on one reader.
        let data = [5u8, 6, 7, 8];
        let mut r = IoReader::new(&data[..]);
        r.read_bytes(2).unwrap();
        assert_eq!(r.pos(), 2);
        let mut rest = Vec::new();
        let mut inner = r.inner;
        inner.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, vec![7, 8]);
    }
}
