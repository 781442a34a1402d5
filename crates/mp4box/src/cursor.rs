//! Recursive-descent box cursor.
//!
//! A [`BoxCursor`] walks one level of sibling boxes over a shared
//! [`Reader`]. Descending into a box yields a child cursor over the
//! same stream, bounded to the parent box's payload; every header read
//! inside a bounded cursor is checked against that bound.

use bytes::Bytes;
use tracing::trace;

use crate::box_type::BoxType;
use crate::error::{Mp4BoxError, Result};
use crate::stream::{ByteSource, Reader};

#[derive(Debug)]
pub struct BoxCursor<'a, S> {
    reader: &'a mut Reader<S>,
    box_start: u64,
    data_start: u64,
    data_size: u64,
    box_type: BoxType,
    /// Absolute end of the enclosing payload, when bounded.
    limit: Option<u64>,
}

impl<'a, S: ByteSource> BoxCursor<'a, S> {
    /// Cursor over the top level of a stream, unbounded.
    ///
    /// An unbounded cursor can never report [`is_last`](Self::is_last);
    /// top-level iteration ends when `next_box` hits end of stream.
    pub fn new(reader: &'a mut Reader<S>) -> Self {
        Self::with_limit(reader, None)
    }

    /// Cursor bounded to the absolute stream offset `limit`.
    pub fn bounded(reader: &'a mut Reader<S>, limit: u64) -> Self {
        Self::with_limit(reader, Some(limit))
    }

    fn with_limit(reader: &'a mut Reader<S>, limit: Option<u64>) -> Self {
        let start = reader.position();
        Self {
            reader,
            box_start: start,
            data_start: start,
            data_size: 0,
            box_type: BoxType::default(),
            limit,
        }
    }

    /// Type of the box the cursor is positioned on.
    pub fn box_type(&self) -> &BoxType {
        &self.box_type
    }

    /// Payload size of the current box.
    pub fn data_size(&self) -> u64 {
        self.data_size
    }

    /// Offset of the current box header in the stream.
    pub fn box_start(&self) -> u64 {
        self.box_start
    }

    /// Offset of the current box payload in the stream.
    pub fn data_start(&self) -> u64 {
        self.data_start
    }

    /// Current stream offset.
    pub fn position(&self) -> u64 {
        self.reader.position()
    }

    /// Absolute end of the enclosing payload, if this cursor is bounded.
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    fn check(&self, len: u64) -> Result<()> {
        if let Some(limit) = self.limit {
            let offset = self.reader.position();
            if offset + len > limit {
                return Err(Mp4BoxError::Overread {
                    offset,
                    requested: len,
                    limit,
                });
            }
        }
        Ok(())
    }

    fn read_value(&mut self, len: usize) -> Result<u64> {
        self.check(len as u64)?;
        self.reader.read_value(len)
    }

    fn read_bytes(&mut self, len: u64) -> Result<Bytes> {
        self.check(len)?;
        self.reader.read_bytes(len)
    }

    /// Skip `len` bytes of the current box payload.
    pub fn skip(&mut self, len: u64) -> Result<()> {
        self.check(len)?;
        self.reader.seek_by(len as i64)
    }

    /// Read a big-endian u32 from the current box payload.
    pub fn read_u32(&mut self) -> Result<u32> {
        self.check(4)?;
        self.reader.read_u32()
    }

    /// Advance to the next sibling box and decode its header.
    ///
    /// Seeks past the previous box's payload first, so a partially read
    /// (or descended-into) payload does not affect iteration.
    pub fn next_box(&mut self) -> Result<()> {
        self.reader.seek_to(self.data_start + self.data_size)?;
        self.box_start = self.reader.position();

        let mut box_size = self.read_value(4)?;
        let mut box_type = BoxType::from_compact(self.read_value(4)? as u32);
        if box_size == 1 {
            box_size = self.read_value(8)?;
        }
        if box_type == BoxType::UUID {
            box_type = BoxType::from_bytes(&self.read_bytes(16)?)?;
        }

        self.data_start = self.reader.position();
        let header_len = self.data_start - self.box_start;
        if box_size < header_len {
            return Err(Mp4BoxError::MalformedBox {
                offset: self.box_start,
                size: box_size,
            });
        }
        self.data_size = box_size - header_len;

        // The box may not claim to extend past the enclosing payload.
        if let Some(limit) = self.limit {
            if self.data_start + self.data_size > limit {
                return Err(Mp4BoxError::Overread {
                    offset: self.data_start,
                    requested: self.data_size,
                    limit,
                });
            }
        }

        self.box_type = box_type;
        trace!(box_type = %self.box_type, size = box_size, offset = self.box_start, "box header");
        Ok(())
    }

    /// Descend into the current box's payload.
    ///
    /// The child borrows the same stream, starts at the current stream
    /// position and is bounded to the current box's payload end. The
    /// parent's own bookkeeping is untouched; its next `next_box` call
    /// reseeks past the payload no matter how much the child consumed.
    pub fn down_box(&mut self) -> BoxCursor<'_, S> {
        let end = self.data_start + self.data_size;
        BoxCursor::with_limit(&mut *self.reader, Some(end))
    }

    fn into_child(self) -> BoxCursor<'a, S> {
        let end = self.data_start + self.data_size;
        BoxCursor::with_limit(self.reader, Some(end))
    }

    /// Read the current box's entire remaining unread payload.
    pub fn read_data(&mut self) -> Result<Bytes> {
        let end = self.data_start + self.data_size;
        let left = end.saturating_sub(self.reader.position());
        self.read_bytes(left)
    }

    /// True iff the current box is the last one the bound admits.
    pub fn is_last(&self) -> bool {
        self.limit == Some(self.data_start + self.data_size)
    }

    /// Walk a type path, descending one level per segment, and return a
    /// cursor positioned on the final match.
    ///
    /// Each sibling scan stops with [`Mp4BoxError::BoxNotFound`] when
    /// the level is exhausted. The returned cursor is clamped to the
    /// matched box, so its bound equals the match's payload end.
    pub fn find(self, path: &[BoxType]) -> Result<BoxCursor<'a, S>> {
        let mut cursor = self;
        let mut segments = path.iter().peekable();
        while let Some(want) = segments.next() {
            loop {
                if cursor.is_last() {
                    return Err(Mp4BoxError::BoxNotFound(want.to_string()));
                }
                cursor.next_box()?;
                if cursor.box_type == *want {
                    break;
                }
            }
            if segments.peek().is_some() {
                cursor = cursor.into_child();
            }
        }
        if !path.is_empty() {
            cursor.limit = Some(cursor.data_start + cursor.data_size);
        }
        Ok(cursor)
    }
}
