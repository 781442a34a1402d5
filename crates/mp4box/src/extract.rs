//! Metadata extraction and chunk-offset patching.
//!
//! Pass 1 walks the top level of a source container and captures the
//! `ftyp`/`moov` payloads plus the location of the `mdat` payload
//! (which is never copied). Pass 2 rewrites every track's `stco` table
//! in the captured `moov` buffer by a signed shift and yields the
//! offset-ordered chunk list that drives the merge.

use std::io;

use bytes::Bytes;
use tracing::debug;

use crate::box_type::BoxType;
use crate::cursor::BoxCursor;
use crate::error::{Mp4BoxError, Result};
use crate::meta::Mp4Metadata;
use crate::stream::{ByteSource, Reader, SliceSource};

/// One chunk's destination: which track (and so which fragment input)
/// it comes from, and its absolute byte offset in the merged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub track: usize,
    pub offset: u64,
}

/// Path from a `trak` box down to its chunk-offset table.
const STCO_PATH: [BoxType; 4] = [BoxType::MDIA, BoxType::MINF, BoxType::STBL, BoxType::STCO];

/// Walk the top level of a source container and capture `ftyp`, `moov`
/// and the `mdat` payload location.
///
/// Stops as soon as all three have been seen; running out of boxes
/// first is a format error naming whichever are still missing.
pub fn extract_metadata<S: ByteSource>(reader: &mut Reader<S>) -> Result<Mp4Metadata> {
    let mut ftyp: Option<Bytes> = None;
    let mut moov: Option<Bytes> = None;
    let mut mdat: Option<(u64, u64)> = None;

    let mut cursor = BoxCursor::new(reader);
    while ftyp.is_none() || moov.is_none() || mdat.is_none() {
        match cursor.next_box() {
            Ok(()) => {}
            Err(Mp4BoxError::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(missing_boxes(&ftyp, &moov, &mdat));
            }
            Err(Mp4BoxError::Overread { .. }) => {
                // In-memory sources report exhaustion as an overread.
                return Err(missing_boxes(&ftyp, &moov, &mdat));
            }
            Err(e) => return Err(e),
        }

        let box_type = *cursor.box_type();
        debug!(box_type = %box_type, offset = cursor.box_start(), size = cursor.data_size(), "top-level box");
        if box_type == BoxType::FTYP {
            ftyp = Some(cursor.read_data()?);
        } else if box_type == BoxType::MOOV {
            moov = Some(cursor.read_data()?);
        } else if box_type == BoxType::MDAT {
            mdat = Some((cursor.data_start(), cursor.data_size()));
        }
    }

    let (mdat_start, mdat_size) = mdat.unwrap();
    Ok(Mp4Metadata {
        ftyp: ftyp.unwrap().to_vec(),
        moov: moov.unwrap().to_vec(),
        mdat_start,
        mdat_size,
    })
}

fn missing_boxes(ftyp: &Option<Bytes>, moov: &Option<Bytes>, mdat: &Option<(u64, u64)>) -> Mp4BoxError {
    let mut missing = Vec::new();
    if ftyp.is_none() {
        missing.push("ftyp");
    }
    if moov.is_none() {
        missing.push("moov");
    }
    if mdat.is_none() {
        missing.push("mdat");
    }
    Mp4BoxError::BoxNotFound(missing.join(", "))
}

/// Shift every `stco` entry in a captured `moov` buffer by `shift`,
/// rewriting the buffer in place, and return the chunk list sorted by
/// destination offset.
///
/// Offsets are linear in the shift, so patching by `a` then `b` equals
/// patching once by `a + b`. A shifted offset that leaves the 32-bit
/// `stco` range is an error, never a wrap.
pub fn patch_chunk_offsets(moov: &mut [u8], shift: i64) -> Result<Vec<Chunk>> {
    let mut chunks = Vec::new();
    let mut patches: Vec<(usize, u32)> = Vec::new();

    {
        let mut reader = Reader::new(SliceSource::new(&*moov));
        let mut cursor = BoxCursor::bounded(&mut reader, moov.len() as u64);
        let mut track = 0usize;
        while !cursor.is_last() {
            cursor.next_box()?;
            debug!(box_type = %cursor.box_type(), "moov box");
            if *cursor.box_type() != BoxType::TRAK {
                continue;
            }

            // TODO: also accept the 64-bit co64 table here.
            let mut stco = cursor.down_box().find(&STCO_PATH)?;
            stco.skip(4)?; // version + flags
            let entry_count = stco.read_u32()?;
            debug!(track, entry_count, "patching chunk offsets");
            for _ in 0..entry_count {
                let entry_pos = stco.position() as usize;
                let offset = stco.read_u32()?;
                let shifted = u32::try_from(i64::from(offset) + shift)
                    .map_err(|_| Mp4BoxError::OffsetOverflow { offset, shift })?;
                patches.push((entry_pos, shifted));
                chunks.push(Chunk {
                    track,
                    offset: u64::from(shifted),
                });
            }
            track += 1;
        }
    }

    for (pos, value) in patches {
        moov[pos..pos + 4].copy_from_slice(&value.to_be_bytes());
    }

    chunks.sort_by_key(|c| c.offset);
    Ok(chunks)
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;
    use crate::test_support::{make_box, make_container, make_stco, make_trak};

    fn extract(data: &[u8]) -> Result<Mp4Metadata> {
        let mut reader = Reader::new(SliceSource::new(data));
        extract_metadata(&mut reader)
    }

    fn moov_payload(traks: &[&[u32]]) -> Vec<u8> {
        traks.iter().flat_map(|t| make_trak(t)).collect()
    }

    #[test]
    fn test_extract_captures_all_three() {
        let payload = b"chunk-one-chunk-two";
        let data = make_container(&[&[100, 250]], payload);
        let meta = extract(&data).unwrap();

        assert_eq!(meta.ftyp, b"isomiso2");
        assert_eq!(meta.moov, moov_payload(&[&[100, 250]]));
        assert_eq!(meta.mdat_size, payload.len() as u64);
        // mdat payload sits right past ftyp + moov + the mdat header.
        let expected_start = (data.len() - payload.len()) as u64;
        assert_eq!(meta.mdat_start, expected_start);
    }

    #[test]
    fn test_extract_stops_once_filled() {
        // A trailing garbage box after mdat must never be touched.
        let mut data = make_container(&[&[10]], b"x");
        data.extend_from_slice(&[0xDE, 0xAD]);
        assert!(extract(&data).is_ok());
    }

    #[test]
    fn test_extract_missing_mdat_is_format_error() {
        let mut data = make_box(b"ftyp", b"isom");
        data.extend_from_slice(&make_box(b"moov", &make_trak(&[1])));
        let err = extract(&data).unwrap_err();
        assert!(matches!(err, Mp4BoxError::BoxNotFound(name) if name == "mdat"));
    }

    #[test]
    fn test_extract_empty_source_names_all_missing() {
        let err = extract(&[]).unwrap_err();
        assert!(matches!(err, Mp4BoxError::BoxNotFound(name) if name == "ftyp, moov, mdat"));
    }

    #[test]
    fn test_patch_rewrites_buffer_in_place() {
        let mut moov = moov_payload(&[&[100, 250]]);
        let chunks = patch_chunk_offsets(&mut moov, 50).unwrap();

        assert_eq!(
            chunks,
            vec![
                Chunk {
                    track: 0,
                    offset: 150
                },
                Chunk {
                    track: 0,
                    offset: 300
                },
            ]
        );
        assert_eq!(moov, moov_payload(&[&[150, 300]]));
    }

    #[test]
    fn test_patch_negative_shift() {
        let mut moov = moov_payload(&[&[100]]);
        let chunks = patch_chunk_offsets(&mut moov, -40).unwrap();
        assert_eq!(chunks[0].offset, 60);
    }

    #[test]
    fn test_patch_sorts_across_tracks() {
        let mut moov = moov_payload(&[&[300, 100], &[200]]);
        let chunks = patch_chunk_offsets(&mut moov, 0).unwrap();
        assert_eq!(
            chunks
                .iter()
                .map(|c| (c.track, c.offset))
                .collect::<Vec<_>>(),
            vec![(0, 100), (1, 200), (0, 300)]
        );
    }

    #[test]
    fn test_patch_shift_composition() {
        let mut once = moov_payload(&[&[100, 250], &[400]]);
        let mut twice = once.clone();

        let combined = patch_chunk_offsets(&mut once, 70).unwrap();
        patch_chunk_offsets(&mut twice, 30).unwrap();
        let stepped = patch_chunk_offsets(&mut twice, 40).unwrap();

        assert_eq!(once, twice);
        assert_eq!(combined, stepped);
    }

    #[test]
    fn test_patch_offset_overflow_is_error() {
        let mut moov = moov_payload(&[&[u32::MAX - 10]]);
        let err = patch_chunk_offsets(&mut moov, 100).unwrap_err();
        assert!(matches!(err, Mp4BoxError::OffsetOverflow { .. }));

        let mut moov = moov_payload(&[&[10]]);
        let err = patch_chunk_offsets(&mut moov, -100).unwrap_err();
        assert!(matches!(err, Mp4BoxError::OffsetOverflow { .. }));
    }

    #[test]
    fn test_patch_trak_without_stco_is_not_found() {
        let mdia = make_box(b"mdia", &make_box(b"minf", &make_box(b"stbl", &[])));
        let mut moov = make_box(b"trak", &mdia);
        let err = patch_chunk_offsets(&mut moov, 0).unwrap_err();
        assert!(matches!(err, Mp4BoxError::BoxNotFound(name) if name == "stco"));
    }

    #[test]
    fn test_patch_skips_non_trak_boxes() {
        let mut moov = make_box(b"mvhd", &[0u8; 16]);
        moov.extend_from_slice(&make_trak(&[5]));
        let chunks = patch_chunk_offsets(&mut moov, 1).unwrap();
        assert_eq!(chunks, vec![Chunk { track: 0, offset: 6 }]);
    }

    #[test]
    fn test_patch_stco_table_longer_than_box_is_overread() {
        // Entry count claims more entries than the box payload holds.
        let mut stco_body = vec![0u8; 4];
        stco_body.extend_from_slice(&4u32.to_be_bytes()); // 4 entries
        stco_body.extend_from_slice(&100u32.to_be_bytes()); // only 1 present
        let stbl = make_box(b"stbl", &make_box(b"stco", &stco_body));
        let mdia = make_box(b"mdia", &make_box(b"minf", &stbl));
        let mut moov = make_box(b"trak", &mdia);

        let err = patch_chunk_offsets(&mut moov, 0).unwrap_err();
        assert!(matches!(err, Mp4BoxError::Overread { .. }));
    }
}
