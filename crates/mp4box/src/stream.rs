//! Byte-stream abstraction used by the box cursor.
//!
//! Exactly two backings exist: a file on disk and an in-memory slice.
//! Both sit behind [`ByteSource`], and [`Reader`] layers the logical
//! byte-position counter on top that all header/offset arithmetic uses.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;

use crate::error::{Mp4BoxError, Result};

/// Minimal random-access byte source contract.
pub trait ByteSource {
    /// Read exactly `dest.len()` bytes or fail.
    fn read(&mut self, dest: &mut [u8]) -> Result<()>;
    /// Seek relative to the current position.
    fn seek_by(&mut self, delta: i64) -> Result<()>;
    /// Seek to an absolute position.
    fn seek_to(&mut self, position: u64) -> Result<()>;
}

/// File-backed byte source.
pub struct FileSource {
    file: File,
}

impl FileSource {
    /// Open a file for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            file: File::open(path)?,
        })
    }
}

impl ByteSource for FileSource {
    fn read(&mut self, dest: &mut [u8]) -> Result<()> {
        self.file.read_exact(dest)?;
        Ok(())
    }

    fn seek_by(&mut self, delta: i64) -> Result<()> {
        self.file.seek(SeekFrom::Current(delta))?;
        Ok(())
    }

    fn seek_to(&mut self, position: u64) -> Result<()> {
        self.file.seek(SeekFrom::Start(position))?;
        Ok(())
    }
}

/// In-memory byte source over a borrowed slice.
///
/// Every read is bounds-checked against the slice length; an
/// out-of-range read fails with [`Mp4BoxError::Overread`] instead of
/// touching memory past the buffer.
#[derive(Debug)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }
}

impl ByteSource for SliceSource<'_> {
    fn read(&mut self, dest: &mut [u8]) -> Result<()> {
        let end = self.position + dest.len();
        if end > self.data.len() {
            return Err(Mp4BoxError::Overread {
                offset: self.position as u64,
                requested: dest.len() as u64,
                limit: self.data.len() as u64,
            });
        }
        dest.copy_from_slice(&self.data[self.position..end]);
        self.position = end;
        Ok(())
    }

    fn seek_by(&mut self, delta: i64) -> Result<()> {
        let position = (self.position as i64).checked_add(delta);
        match position {
            Some(p) if p >= 0 => {
                self.position = p as usize;
                Ok(())
            }
            _ => Err(Mp4BoxError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of buffer",
            ))),
        }
    }

    fn seek_to(&mut self, position: u64) -> Result<()> {
        self.position = position as usize;
        Ok(())
    }
}

/// Position-tracking reader over a [`ByteSource`].
///
/// Owns the backing and maintains the logical offset; intentionally not
/// `Clone`, so the position counter cannot be duplicated behind the
/// cursor's back.
#[derive(Debug)]
pub struct Reader<S> {
    source: S,
    position: u64,
}

impl<S: ByteSource> Reader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            position: 0,
        }
    }

    /// Current logical offset in the stream.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn seek_by(&mut self, delta: i64) -> Result<()> {
        let position = self.position.checked_add_signed(delta).ok_or_else(|| {
            Mp4BoxError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of stream",
            ))
        })?;
        self.source.seek_by(delta)?;
        self.position = position;
        Ok(())
    }

    pub fn seek_to(&mut self, position: u64) -> Result<()> {
        self.source.seek_to(position)?;
        self.position = position;
        Ok(())
    }

    pub fn read_exact(&mut self, dest: &mut [u8]) -> Result<()> {
        self.source.read(dest)?;
        self.position += dest.len() as u64;
        Ok(())
    }

    /// Read a big-endian unsigned value of `len` bytes (1..=8).
    pub fn read_value(&mut self, len: usize) -> Result<u64> {
        debug_assert!((1..=8).contains(&len));
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf[..len])?;
        Ok(BigEndian::read_uint(&buf[..len], len))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(BigEndian::read_u32(&buf))
    }

    /// Read `len` bytes into an owned buffer.
    pub fn read_bytes(&mut self, len: u64) -> Result<Bytes> {
        let mut buf = vec![0u8; len as usize];
        self.read_exact(&mut buf)?;
        Ok(Bytes::from(buf))
    }
}

/// Position-tracking writer for the merge output.
pub struct StreamWriter<W: Write> {
    inner: W,
    position: u64,
}

impl<W: Write> StreamWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, position: 0 }
    }

    /// Current output offset.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data)?;
        self.position += data.len() as u64;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
