//! Captured-metadata record and its persisted protobuf form.

use std::fs;
use std::path::Path;

use prost::Message;

use crate::error::Result;

/// Metadata captured from a source container, persisted between the
/// extract and merge runs.
///
/// `moov` is the raw captured payload; the offset-patch pass rewrites
/// its `stco` entries in place before the merge writes it out.
/// `mdat_start` and `mdat_size` describe the source `mdat` *payload*
/// (not the box header), so the merge-time shift stays correct even
/// when the rebuilt `mdat` header differs in length from the original.
#[derive(Clone, PartialEq, Message)]
pub struct Mp4Metadata {
    /// Raw `ftyp` payload bytes.
    #[prost(bytes = "vec", tag = "1")]
    pub ftyp: Vec<u8>,
    /// Raw `moov` payload bytes.
    #[prost(bytes = "vec", tag = "2")]
    pub moov: Vec<u8>,
    /// `mdat` payload start offset in the source file.
    #[prost(uint64, tag = "3")]
    pub mdat_start: u64,
    /// `mdat` payload length in bytes.
    #[prost(uint64, tag = "4")]
    pub mdat_size: u64,
}

impl Mp4Metadata {
    /// Persist the record to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.encode_to_vec())?;
        Ok(())
    }

    /// Load a previously persisted record.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let buf = fs::read(path)?;
        Ok(Self::decode(buf.as_slice())?)
    }
}
