//! Shared ISOBMFF test builders.
//!
//! Available for local tests and optionally for downstream crate tests
//! when the `test-utils` feature is enabled.

/// Box with a plain 32-bit size header.
pub fn make_box(fourcc: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let size = (8 + body.len()) as u32;
    let mut out = Vec::with_capacity(size as usize);
    out.extend_from_slice(&size.to_be_bytes());
    out.extend_from_slice(fourcc);
    out.extend_from_slice(body);
    out
}

/// Box that uses the 64-bit size sentinel even though it would fit in 32 bits.
pub fn make_box_ext_size(fourcc: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let size = (16 + body.len()) as u64;
    let mut out = Vec::with_capacity(size as usize);
    out.extend_from_slice(&1u32.to_be_bytes());
    out.extend_from_slice(fourcc);
    out.extend_from_slice(&size.to_be_bytes());
    out.extend_from_slice(body);
    out
}

/// `uuid` box carrying a 16-byte extended type.
pub fn make_uuid_box(extended_type: &[u8; 16], body: &[u8]) -> Vec<u8> {
    let size = (8 + 16 + body.len()) as u32;
    let mut out = Vec::with_capacity(size as usize);
    out.extend_from_slice(&size.to_be_bytes());
    out.extend_from_slice(b"uuid");
    out.extend_from_slice(extended_type);
    out.extend_from_slice(body);
    out
}

/// `stco` box (FullBox) holding the given 32-bit chunk offsets.
pub fn make_stco(offsets: &[u32]) -> Vec<u8> {
    let mut body = vec![0u8; 4]; // version + flags
    body.extend_from_slice(&(offsets.len() as u32).to_be_bytes());
    for offset in offsets {
        body.extend_from_slice(&offset.to_be_bytes());
    }
    make_box(b"stco", &body)
}

/// `trak` tree down to an `stco` with the given offsets.
pub fn make_trak(offsets: &[u32]) -> Vec<u8> {
    let stbl = make_box(b"stbl", &make_stco(offsets));
    let minf = make_box(b"minf", &stbl);
    let mdia = make_box(b"mdia", &minf);
    make_box(b"trak", &mdia)
}

/// Full single-file container: `ftyp` + `moov` (one trak per offset
/// slice) + `mdat` with the given payload.
pub fn make_container(traks: &[&[u32]], mdat_payload: &[u8]) -> Vec<u8> {
    let ftyp = make_box(b"ftyp", b"isomiso2");
    let moov_body: Vec<u8> = traks.iter().flat_map(|t| make_trak(t)).collect();
    let moov = make_box(b"moov", &moov_body);
    let mdat = make_box(b"mdat", mdat_payload);

    let mut out = Vec::new();
    out.extend_from_slice(&ftyp);
    out.extend_from_slice(&moov);
    out.extend_from_slice(&mdat);
    out
}
