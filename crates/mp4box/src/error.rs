//! Error types for box-level ISOBMFF operations.

use thiserror::Error;

/// Errors that can occur while parsing or rebuilding an ISOBMFF container.
#[derive(Error, Debug)]
pub enum Mp4BoxError {
    /// An I/O error occurred on the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A read or seek would cross the enclosing box boundary.
    #[error("read overflow at offset {offset}: {requested} bytes requested, {limit} is the bound")]
    Overread {
        /// Stream offset at which the read was attempted.
        offset: u64,
        /// Number of bytes the read would have consumed.
        requested: u64,
        /// Absolute offset the enclosing box ends at.
        limit: u64,
    },

    /// A box type longer than the fixed 16-byte slot.
    #[error("box type too long: {0} bytes (16 is the maximum)")]
    TypeTooLong(usize),

    /// A box whose declared size cannot even hold its own header.
    #[error("malformed box at offset {offset}: declared size {size} is smaller than its header")]
    MalformedBox {
        /// Offset of the box header in the stream.
        offset: u64,
        /// Declared total box size.
        size: u64,
    },

    /// A required box was not found where the format demands it.
    #[error("box not found: {0}")]
    BoxNotFound(String),

    /// A patched chunk offset left the 32-bit range of the `stco` table.
    #[error("chunk offset {offset} shifted by {shift} leaves the 32-bit stco range")]
    OffsetOverflow {
        /// Offset read from the table before shifting.
        offset: u32,
        /// Shift that was applied.
        shift: i64,
    },

    /// A merge-time assumption about chunk/track alignment was violated.
    #[error("merge precondition violated: {0}")]
    Precondition(String),

    /// Metadata record decode failure.
    #[error("metadata decode error: {0}")]
    MetaDecode(#[from] prost::DecodeError),
}

/// Result type alias for box-level operations.
pub type Result<T> = std::result::Result<T, Mp4BoxError>;
