//! Item-level primitives of the canonical CBOR subset.
//!
//! Heads are always written in minimal-length form and decoders reject any
//! non-minimal head, so every value has exactly one encoding.

use super::{EncodeSink, MAX_BYTES_LEN};
use crate::codec::reader::CborRead;
use crate::error::{Error, Result};
use crate::types::bytes::Bytes;

/// Major type 0: unsigned integer.
pub const MAJOR_UINT: u8 = 0;
/// Major type 2: byte string.
pub const MAJOR_BYTES: u8 = 2;
/// Major type 4: array.
pub const MAJOR_ARRAY: u8 = 4;
/// Major type 7: simple values; only null is accepted.
pub const MAJOR_SIMPLE: u8 = 7;

/// The encoded null item, a single byte.
pub const NULL: u8 = 0xf6;
/// Argument value of null within major type 7.
pub const NULL_ARG: u64 = 22;

/// Head of a zero-length byte string: the canonical "absent" marker for
/// optional byte fields.
pub const EMPTY_BYTES: u8 = 0x40;

/// A decoded item head: major type plus argument (value, length or count).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Head {
    pub major: u8,
    pub arg: u64,
}

impl Head {
    /// `true` if this head is the null item.
    pub fn is_null(&self) -> bool {
        self.major == MAJOR_SIMPLE && self.arg == NULL_ARG
    }
}

/// Writes an item head with the minimal-length argument encoding.
pub fn write_head<S: EncodeSink>(out: &mut S, major: u8, arg: u64) {
    let high = major << 5;
    if arg < 24 {
        out.write(&[high | arg as u8]);
    } else if arg <= 0xff {
        out.write(&[high | 24, arg as u8]);
    } else if arg <= 0xffff {
        out.write(&[high | 25]);
        out.write(&(arg as u16).to_be_bytes());
    } else if arg <= 0xffff_ffff {
        out.write(&[high | 26]);
        out.write(&(arg as u32).to_be_bytes());
    } else {
        out.write(&[high | 27]);
        out.write(&arg.to_be_bytes());
    }
}

/// Writes an unsigned integer item.
pub fn write_uint<S: EncodeSink>(out: &mut S, value: u64) {
    write_head(out, MAJOR_UINT, value);
}

/// Writes a byte-string item (head plus payload).
pub fn write_bytes<S: EncodeSink>(out: &mut S, bytes: &[u8]) {
    write_head(out, MAJOR_BYTES, bytes.len() as u64);
    out.write(bytes);
}

/// Writes an array head for `count` following items.
pub fn write_array_head<S: EncodeSink>(out: &mut S, count: u64) {
    write_head(out, MAJOR_ARRAY, count);
}

/// Writes the null item.
pub fn write_null<S: EncodeSink>(out: &mut S) {
    out.write(&[NULL]);
}

/// Reads and validates an item head.
///
/// Rejects reserved and indefinite-length info values, non-minimal argument
/// encodings, and every major-7 item other than null.
pub fn read_head<R: CborRead>(r: &mut R) -> Result<Head> {
    let at = r.pos();
    let initial = r.read_byte()?;
    let major = initial >> 5;
    let info = initial & 0x1f;

    if major == MAJOR_SIMPLE {
        if initial == NULL {
            return Ok(Head {
                major: MAJOR_SIMPLE,
                arg: NULL_ARG,
            });
        }
        return Err(Error::InvalidEncoding {
            at,
            what: "unsupported simple value",
        });
    }

    let (arg, minimal) = match info {
        0..=23 => (info as u64, 0),
        24 => (r.read_fixed::<1>()?[0] as u64, 24),
        25 => (u16::from_be_bytes(r.read_fixed::<2>()?) as u64, 0x100),
        26 => (u32::from_be_bytes(r.read_fixed::<4>()?) as u64, 0x1_0000),
        27 => (u64::from_be_bytes(r.read_fixed::<8>()?), 0x1_0000_0000),
        _ => {
            return Err(Error::InvalidEncoding {
                at,
                what: "indefinite or reserved length",
            });
        }
    };
    if arg < minimal {
        return Err(Error::InvalidEncoding {
            at,
            what: "non-minimal head",
        });
    }
    Ok(Head { major, arg })
}

/// Reads an array head and checks it announces exactly `count` items.
pub fn expect_array<R: CborRead>(r: &mut R, count: u64) -> Result<()> {
    let at = r.pos();
    let head = read_head(r)?;
    if head.major != MAJOR_ARRAY {
        return Err(Error::InvalidEncoding {
            at,
            what: "expected array",
        });
    }
    if head.arg != count {
        return Err(Error::InvalidEncoding {
            at,
            what: "wrong element count",
        });
    }
    Ok(())
}

/// Reads an unsigned integer item.
pub fn read_uint<R: CborRead>(r: &mut R) -> Result<u64> {
    let at = r.pos();
    let head = read_head(r)?;
    if head.major != MAJOR_UINT {
        return Err(Error::InvalidEncoding {
            at,
            what: "expected unsigned integer",
        });
    }
    Ok(head.arg)
}

/// Reads a byte-string item of any length up to `max`.
pub fn read_byte_string<R: CborRead>(r: &mut R, max: u64) -> Result<Bytes> {
    let at = r.pos();
    let head = read_head(r)?;
    if head.major != MAJOR_BYTES {
        return Err(Error::InvalidEncoding {
            at,
            what: "expected byte string",
        });
    }
    if head.arg > max {
        return Err(Error::LengthOverflow {
            at,
            len: head.arg,
            max,
        });
    }
    r.read_bytes(head.arg as usize)
}

/// Reads a byte-string item that must be exactly `N` bytes long.
pub fn read_fixed_bytes<R: CborRead, const N: usize>(r: &mut R) -> Result<[u8; N]> {
    let at = r.pos();
    let head = read_head(r)?;
    if head.major != MAJOR_BYTES {
        return Err(Error::InvalidEncoding {
            at,
            what: "expected byte string",
        });
    }
    if head.arg != N as u64 {
        return Err(Error::InvalidEncoding {
            at,
            what: "wrong byte string length",
        });
    }
    r.read_fixed::<N>()
}

/// Reads a byte-string item that is either empty (absent) or exactly `N`
/// bytes long.
pub fn read_optional_fixed_bytes<R: CborRead, const N: usize>(r: &mut R) -> Result<Option<[u8; N]>> {
    let at = r.pos();
    let head = read_head(r)?;
    if head.major != MAJOR_BYTES {
        return Err(Error::InvalidEncoding {
            at,
            what: "expected byte string",
        });
    }
    match head.arg {
        0 => Ok(None),
        n if n == N as u64 => Ok(Some(r.read_fixed::<N>()?)),
        _ => Err(Error::InvalidEncoding {
            at,
            what: "wrong optional byte string length",
        }),
    }
}

/// Reads a byte-string item bounded by [`MAX_BYTES_LEN`].
pub fn read_payload<R: CborRead>(r: &mut R) -> Result<Bytes> {
    read_byte_string(r, MAX_BYTES_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::reader::SliceReader;

    fn reader(bytes: &[u8]) -> SliceReader {
        SliceReader::new(&Bytes::new(bytes))
    }

    #[test]
    fn uint_heads_are_minimal() {
        let cases: [(u64, &[u8]); 7] = [
            (0, &[0x00]),
            (23, &[0x17]),
            (24, &[0x18, 24]),
            (255, &[0x18, 0xff]),
            (256, &[0x19, 0x01, 0x00]),
            (65_536, &[0x1a, 0x00, 0x01, 0x00, 0x00]),
            (1 << 32, &[0x1b, 0, 0, 0, 1, 0, 0, 0, 0]),
        ];
        for (value, expected) in cases {
            let mut out = Vec::new();
            write_uint(&mut out, value);
            assert_eq!(out, expected, "encoding of {value}");
            assert_eq!(read_uint(&mut reader(&out)).unwrap(), value);
        }
    }

    #[test]
    fn non_minimal_heads_are_rejected() {
        // 10 encoded with a one-byte argument instead of directly.
        let res = read_uint(&mut reader(&[0x18, 0x0a]));
        assert!(matches!(
            res,
            Err(Error::InvalidEncoding {
                at: 0,
                what: "non-minimal head"
            })
        ));
        // 100 encoded with a two-byte argument.
        let res = read_uint(&mut reader(&[0x19, 0x00, 0x64]));
        assert!(matches!(res, Err(Error::InvalidEncoding { .. })));
    }

    #[test]
    fn indefinite_lengths_are_rejected() {
        // 0x5f starts an indefinite-length byte string.
        let res = read_head(&mut reader(&[0x5f]));
        assert!(matches!(
            res,
            Err(Error::InvalidEncoding {
                what: "indefinite or reserved length",
                ..
            })
        ));
    }

    #[test]
    fn null_is_the_only_simple_value() {
        let head = read_head(&mut reader(&[NULL])).unwrap();
        assert!(head.is_null());
        // 0xf5 is CBOR `true`, outside the canonical subset.
        let res = read_head(&mut reader(&[0xf5]));
        assert!(matches!(res, Err(Error::InvalidEncoding { .. })));
    }

    #[test]
    fn byte_string_roundtrip() {
        let payload = [0xde, 0xad, 0xbe, 0xef];
        let mut out = Vec::new();
        write_bytes(&mut out, &payload);
        assert_eq!(out[0], 0x44);
        let decoded = read_payload(&mut reader(&out)).unwrap();
        assert_eq!(decoded.as_slice(), &payload);
    }

    #[test]
    fn empty_byte_string_is_single_marker_byte() {
        let mut out = Vec::new();
        write_bytes(&mut out, &[]);
        assert_eq!(out, [EMPTY_BYTES]);
    }

    #[test]
    fn sixty_four_byte_string_head_is_two_bytes() {
        // The signature shape: 64 exceeds the largest direct argument (23),
        // so the head is 0x58 0x40.
        let mut out = Vec::new();
        write_bytes(&mut out, &[0u8; 64]);
        assert_eq!(&out[..2], &[0x58, 0x40]);
        assert_eq!(out.len(), 66);
    }

    #[test]
    fn fixed_bytes_enforce_length() {
        let mut out = Vec::new();
        write_bytes(&mut out, &[7u8; 32]);
        assert_eq!(
            read_fixed_bytes::<_, 32>(&mut reader(&out)).unwrap(),
            [7u8; 32]
        );
        let res = read_fixed_bytes::<_, 16>(&mut reader(&out));
        assert!(matches!(res, Err(Error::InvalidEncoding { .. })));
    }

    #[test]
    fn optional_fixed_bytes_accept_absent_and_exact() {
        assert_eq!(
            read_optional_fixed_bytes::<_, 32>(&mut reader(&[EMPTY_BYTES])).unwrap(),
            None
        );
        let mut out = Vec::new();
        write_bytes(&mut out, &[3u8; 32]);
        assert_eq!(
            read_optional_fixed_bytes::<_, 32>(&mut reader(&out)).unwrap(),
            Some([3u8; 32])
        );
        let mut short = Vec::new();
        write_bytes(&mut short, &[3u8; 16]);
        let res = read_optional_fixed_bytes::<_, 32>(&mut reader(&short));
        assert!(matches!(res, Err(Error::InvalidEncoding { .. })));
    }

    #[test]
    fn oversized_length_head_overflows() {
        let mut out = Vec::new();
        write_head(&mut out, MAJOR_BYTES, MAX_BYTES_LEN + 1);
        let res = read_payload(&mut reader(&out));
        assert!(matches!(res, Err(Error::LengthOverflow { .. })));
    }

    #[test]
    fn array_head_must_match_count() {
        let mut out = Vec::new();
        write_array_head(&mut out, 7);
        assert_eq!(out, [0x87]);
        assert!(expect_array(&mut reader(&out), 7).is_ok());
        assert!(matches!(
            expect_array(&mut reader(&out), 9),
            Err(Error::InvalidEncoding {
                what: "wrong element count",
                ..
            })
        ));
    }

    #[test]
    fn truncated_head_argument_is_eof() {
        let res = read_uint(&mut reader(&[0x19, 0x01]));
        assert!(matches!(res, Err(Error::UnexpectedEof { .. })));
    }
}
