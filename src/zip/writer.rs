//! Little-endian binary writer over an owned, growable buffer.
//!
//! Every ZIP record is written through [`ByteWriter`]. Each write returns the
//! advanced position, so record sizes fall out of the writer rather than out
//! of hand-maintained offset counters.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

/// Cursor appending typed little-endian values to a `Vec<u8>`.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Create a writer with room for `capacity` bytes before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Current position, which is also the number of bytes written so far.
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn write_u16(&mut self, value: u16) -> io::Result<usize> {
        self.buf.write_u16::<LittleEndian>(value)?;
        Ok(self.position())
    }

    pub fn write_u32(&mut self, value: u32) -> io::Result<usize> {
        self.buf.write_u32::<LittleEndian>(value)?;
        Ok(self.position())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.write_all(bytes)?;
        Ok(self.position())
    }

    /// Append the contents of another writer.
    pub fn append(&mut self, other: ByteWriter) -> usize {
        self.buf.extend(other.buf);
        self.position()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}
