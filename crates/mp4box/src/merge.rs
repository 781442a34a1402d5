//! Fragment merge: reassemble one container from fragment inputs.

use std::io::Write;

use tracing::{debug, info};

use crate::box_type::BoxType;
use crate::cursor::BoxCursor;
use crate::error::{Mp4BoxError, Result};
use crate::extract::patch_chunk_offsets;
use crate::header::encode_header;
use crate::meta::Mp4Metadata;
use crate::stream::{ByteSource, Reader, StreamWriter};

/// Write a merged container from a captured metadata record and one
/// fragment input per track.
///
/// The record's `moov` buffer is patched in place with the shift
/// between the source and destination `mdat` payload positions, then
/// `ftyp`, the patched `moov` and a freshly sized `mdat` header are
/// written, followed by every chunk's payload in ascending destination
/// offset. Each fragment's cursor only ever moves forward; chunks for
/// a track must appear in its fragment in the same order as their
/// destination offsets.
pub fn merge_fragments<W: Write, S: ByteSource>(
    out: &mut StreamWriter<W>,
    meta: &mut Mp4Metadata,
    inputs: &mut [Reader<S>],
) -> Result<()> {
    out.write_all(&encode_header(BoxType::FTYP, meta.ftyp.len() as u64))?;
    out.write_all(&meta.ftyp)?;

    let moov_header = encode_header(BoxType::MOOV, meta.moov.len() as u64);
    let mdat_header = encode_header(BoxType::MDAT, meta.mdat_size);
    let mdat_data_start =
        out.position() + moov_header.len() as u64 + meta.moov.len() as u64 + mdat_header.len() as u64;
    let shift = mdat_data_start as i64 - meta.mdat_start as i64;
    info!(shift, mdat_data_start, "patching chunk offsets for merge");

    let chunks = patch_chunk_offsets(&mut meta.moov, shift)?;
    out.write_all(&moov_header)?;
    out.write_all(&meta.moov)?;
    out.write_all(&mdat_header)?;

    let input_count = inputs.len();
    let mut cursors: Vec<BoxCursor<'_, S>> = inputs.iter_mut().map(BoxCursor::new).collect();
    for chunk in &chunks {
        let cursor = cursors.get_mut(chunk.track).ok_or_else(|| {
            Mp4BoxError::Precondition(format!(
                "chunk references track {} but only {input_count} fragment inputs were given",
                chunk.track
            ))
        })?;

        // Advance to this track's next mdat; fragments interleave their
        // payload across successive mdat boxes.
        loop {
            cursor.next_box()?;
            if *cursor.box_type() == BoxType::MDAT {
                break;
            }
        }
        let data = cursor.read_data()?;
        debug!(track = chunk.track, offset = chunk.offset, len = data.len(), "chunk written");
        out.write_all(&data)?;
    }

    out.flush()?;
    Ok(())
}
