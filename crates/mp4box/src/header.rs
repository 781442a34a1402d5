//! Box-header encoding.

use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;

use crate::box_type::BoxType;

/// Encode a box header for a payload of `data_size` bytes.
///
/// The declared box size includes the header itself. The 64-bit size
/// path (sentinel `1` in the 4-byte field, true size in a trailing
/// u64) is taken when header plus payload exceeds the 32-bit maximum;
/// extended types write their full 16 bytes after the size region.
pub fn encode_header(box_type: BoxType, data_size: u64) -> Bytes {
    let mut header_size: u64 = 4 + 4;
    if !box_type.is_compact() {
        header_size += 16;
    }
    let large = header_size + data_size > u64::from(u32::MAX);
    if large {
        header_size += 8;
    }
    let total_size = header_size + data_size;

    let mut header = vec![0u8; header_size as usize];
    if large {
        BigEndian::write_u32(&mut header[0..4], 1);
        BigEndian::write_u64(&mut header[8..16], total_size);
    } else {
        BigEndian::write_u32(&mut header[0..4], total_size as u32);
    }
    BigEndian::write_u32(&mut header[4..8], box_type.compact_code());
    if !box_type.is_compact() {
        let pos = if large { 16 } else { 8 };
        header[pos..pos + 16].copy_from_slice(box_type.as_full());
    }
    Bytes::from(header)
}
