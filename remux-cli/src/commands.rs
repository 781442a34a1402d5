use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::info;

use mp4box::{
    FileSource, Mp4Metadata, Reader, StreamWriter, extract_metadata, merge_fragments,
    patch_chunk_offsets,
};

use crate::error::Result;

/// Capture `ftyp`/`moov`/`mdat` metadata from `input` and persist it.
pub fn extract(input: &Path, meta_path: &Path) -> Result<()> {
    let mut reader = Reader::new(FileSource::open(input)?);
    let meta = extract_metadata(&mut reader)?;
    info!(
        ftyp = meta.ftyp.len(),
        moov = meta.moov.len(),
        mdat_start = meta.mdat_start,
        mdat_size = meta.mdat_size,
        "metadata captured"
    );

    // Dry-run the offset walk so a source with a broken moov fails at
    // extract time, not at merge time.
    let mut probe = meta.moov.clone();
    let chunks = patch_chunk_offsets(&mut probe, 0)?;
    let tracks = chunks.iter().map(|c| c.track).max().map_or(0, |t| t + 1);
    info!(tracks, chunks = chunks.len(), "moov parsed");

    meta.save(meta_path)?;
    info!(path = %meta_path.display(), "metadata record written");
    Ok(())
}

/// Reassemble `output` from a metadata record and fragment inputs.
pub fn merge(output: &Path, meta_path: &Path, fragments: &[PathBuf]) -> Result<()> {
    let mut meta = Mp4Metadata::load(meta_path)?;

    let mut inputs = fragments
        .iter()
        .map(|path| Ok(Reader::new(FileSource::open(path)?)))
        .collect::<Result<Vec<_>>>()?;

    let mut out = StreamWriter::new(BufWriter::new(File::create(output)?));
    merge_fragments(&mut out, &mut meta, &mut inputs)?;
    info!(path = %output.display(), bytes = out.position(), "merged container written");
    Ok(())
}
