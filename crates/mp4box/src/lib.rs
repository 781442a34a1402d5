//! Box-level ISOBMFF (ISO Base Media File Format) parsing and fragment
//! reassembly.
//!
//! The crate walks MP4 containers one box at a time with a bounds-checked
//! recursive-descent cursor, captures the `ftyp`/`moov`/`mdat` metadata
//! a later merge needs, rewrites `stco` chunk-offset tables when payloads
//! move, and reassembles one standard container from a set of fragmented
//! inputs in chunk-offset order.

pub mod box_type;
pub mod cursor;
pub mod error;
pub mod extract;
pub mod header;
pub mod merge;
pub mod meta;
pub mod stream;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use box_type::BoxType;
pub use cursor::BoxCursor;
pub use error::{Mp4BoxError, Result};
pub use extract::{Chunk, extract_metadata, patch_chunk_offsets};
pub use header::encode_header;
pub use merge::merge_fragments;
pub use meta::Mp4Metadata;
pub use stream::{ByteSource, FileSource, Reader, SliceSource, StreamWriter};
