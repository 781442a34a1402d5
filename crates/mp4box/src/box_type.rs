//! Box-type identity: compact FourCC vs extended `uuid` forms.

use std::fmt;

use crate::error::{Mp4BoxError, Result};

const TYPE_LEN: usize = 16;

/// 16-byte box identifier.
///
/// Compact types (plain FourCCs) occupy the last 4 bytes with the first
/// 12 all zero; extended (`uuid`) types use the full 16 bytes. Equality
/// always compares the full width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoxType([u8; TYPE_LEN]);

impl BoxType {
    pub const FTYP: BoxType = BoxType::from_fourcc(*b"ftyp");
    pub const MOOV: BoxType = BoxType::from_fourcc(*b"moov");
    pub const MDAT: BoxType = BoxType::from_fourcc(*b"mdat");
    pub const TRAK: BoxType = BoxType::from_fourcc(*b"trak");
    pub const MDIA: BoxType = BoxType::from_fourcc(*b"mdia");
    pub const MINF: BoxType = BoxType::from_fourcc(*b"minf");
    pub const STBL: BoxType = BoxType::from_fourcc(*b"stbl");
    pub const STCO: BoxType = BoxType::from_fourcc(*b"stco");
    pub const UUID: BoxType = BoxType::from_fourcc(*b"uuid");

    /// Build a compact type from a FourCC.
    pub const fn from_fourcc(fourcc: [u8; 4]) -> Self {
        let mut bytes = [0u8; TYPE_LEN];
        bytes[12] = fourcc[0];
        bytes[13] = fourcc[1];
        bytes[14] = fourcc[2];
        bytes[15] = fourcc[3];
        Self(bytes)
    }

    /// Build a compact type from a 32-bit code.
    pub const fn from_compact(code: u32) -> Self {
        Self::from_fourcc(code.to_be_bytes())
    }

    /// Build a type from an arbitrary byte run, right-aligned into the
    /// 16-byte slot. Runs longer than 16 bytes are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > TYPE_LEN {
            return Err(Mp4BoxError::TypeTooLong(bytes.len()));
        }
        let mut full = [0u8; TYPE_LEN];
        full[TYPE_LEN - bytes.len()..].copy_from_slice(bytes);
        Ok(Self(full))
    }

    /// Build a type from a short text code such as `"ftyp"`.
    pub fn from_code(code: &str) -> Result<Self> {
        Self::from_bytes(code.as_bytes())
    }

    /// True iff the first 12 bytes are all zero.
    pub fn is_compact(&self) -> bool {
        self.0[..12].iter().all(|&b| b == 0)
    }

    /// The 4-byte code written into a box header: the FourCC itself for
    /// compact types, the literal `uuid` for extended ones (the full 16
    /// bytes still follow the header in that case).
    pub fn compact_code(&self) -> u32 {
        if self.is_compact() {
            u32::from_be_bytes([self.0[12], self.0[13], self.0[14], self.0[15]])
        } else {
            u32::from_be_bytes(*b"uuid")
        }
    }

    /// Full 16-byte identifier.
    pub fn as_full(&self) -> &[u8; TYPE_LEN] {
        &self.0
    }
}

impl fmt::Display for BoxType {
    /// Renders the 4-byte window for compact types and all 16 bytes for
    /// extended ones; non-alphanumeric bytes appear as `\xHH`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let window = if self.is_compact() {
            &self.0[12..]
        } else {
            &self.0[..]
        };
        for &b in window {
            if b.is_ascii_alphanumeric() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc_type_is_compact() {
        let t = BoxType::from_code("ftyp").unwrap();
        assert!(t.is_compact());
        assert_eq!(t, BoxType::FTYP);
        assert_eq!(t.compact_code(), u32::from_be_bytes(*b"ftyp"));
    }

    #[test]
    fn test_compact_code_round_trip() {
        let code = u32::from_be_bytes(*b"moov");
        let t = BoxType::from_compact(code);
        assert_eq!(t, BoxType::MOOV);
        assert_eq!(t.compact_code(), code);
    }

    #[test]
    fn test_extended_type_is_not_compact() {
        let raw: [u8; 16] = *b"0123456789abcdef";
        let t = BoxType::from_bytes(&raw).unwrap();
        assert!(!t.is_compact());
        assert_eq!(t.as_full(), &raw);
        assert_eq!(t.compact_code(), u32::from_be_bytes(*b"uuid"));
    }

    #[test]
    fn test_fifteen_byte_run_is_extended() {
        let t = BoxType::from_bytes(&[1u8; 15]).unwrap();
        assert!(!t.is_compact());
    }

    #[test]
    fn test_too_long_type_rejected() {
        let err = BoxType::from_bytes(&[0u8; 17]).unwrap_err();
        assert!(matches!(err, Mp4BoxError::TypeTooLong(17)));
    }

    #[test]
    fn test_equality_is_full_width() {
        let mut raw = [0u8; 16];
        raw[12..].copy_from_slice(b"ftyp");
        let compact = BoxType::from_bytes(&raw).unwrap();
        raw[0] = 1;
        let extended = BoxType::from_bytes(&raw).unwrap();
        assert_ne!(compact, extended);
    }

    #[test]
    fn test_display_escapes_non_alphanumeric() {
        assert_eq!(BoxType::FTYP.to_string(), "ftyp");
        let t = BoxType::from_fourcc([b'a', 0x00, b'1', 0xFF]);
        assert_eq!(t.to_string(), "a\\x001\\xff");
    }

    #[test]
    fn test_display_extended_uses_full_window() {
        let t = BoxType::from_bytes(&[b'x'; 16]).unwrap();
        assert_eq!(t.to_string(), "x".repeat(16));
    }

    #[test]
    fn test_default_is_zeroed_compact() {
        let t = BoxType::default();
        assert!(t.is_compact());
        assert_eq!(t.compact_code(), 0);
    }
}
