use std::io;

use crate::error::{Error, Result};

use super::writer::ByteWriter;

/// Version 2.0: the lowest that covers stored entries and directories.
pub const VERSION: u16 = 20;

/// Name used when an entry would otherwise have an empty file name.
pub const PLACEHOLDER_NAME: &str = "file";

/// ZIP compression methods this writer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
}

impl CompressionMethod {
    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
        }
    }
}

/// A UTF-8 file name whose encoded length fits the 16-bit length field.
///
/// Empty names are replaced with [`PLACEHOLDER_NAME`]; readers handle
/// zero-length names poorly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryName {
    name: String,
    len: u16,
}

impl EntryName {
    pub fn new(name: &str) -> Result<Self> {
        let name = if name.is_empty() { PLACEHOLDER_NAME } else { name };
        let len = u16::try_from(name.len()).map_err(|_| Error::NameTooLong {
            name: name.chars().take(64).collect(),
            len: name.len(),
        })?;
        Ok(Self {
            name: name.to_string(),
            len,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.name.as_bytes()
    }

    /// Encoded length as stored in the length fields.
    pub fn len_u16(&self) -> u16 {
        self.len
    }
}

/// Local File Header (LFH) - 30 bytes + file name
#[derive(Debug, Clone, Copy)]
pub struct LocalFileHeader<'a> {
    pub file_name: &'a EntryName,
    pub compression_method: CompressionMethod,
    pub crc32: u32,
    pub size: u32,
}

impl LocalFileHeader<'_> {
    pub const SIGNATURE: u32 = 0x04034b50;
    pub const SIZE: usize = 30;

    /// Bytes taken by the header and name, not counting the payload.
    pub fn encoded_len(&self) -> usize {
        Self::SIZE + self.file_name.as_bytes().len()
    }

    pub fn write_to(&self, w: &mut ByteWriter) -> io::Result<usize> {
        w.write_u32(Self::SIGNATURE)?;
        w.write_u16(VERSION)?; // version needed to extract
        w.write_u16(0)?; // general purpose flags
        w.write_u16(self.compression_method.as_u16())?;
        w.write_u16(0)?; // last mod time
        w.write_u16(0)?; // last mod date
        w.write_u32(self.crc32)?;
        w.write_u32(self.size)?; // compressed size
        w.write_u32(self.size)?; // uncompressed size
        w.write_u16(self.file_name.len_u16())?;
        w.write_u16(0)?; // extra field length
        w.write_bytes(self.file_name.as_bytes())
    }
}

/// Central Directory File Header (CDFH) - 46 bytes + file name
#[derive(Debug, Clone, Copy)]
pub struct CentralDirectoryHeader<'a> {
    pub file_name: &'a EntryName,
    pub compression_method: CompressionMethod,
    pub crc32: u32,
    pub size: u32,
    pub lfh_offset: u32,
}

impl CentralDirectoryHeader<'_> {
    pub const SIGNATURE: u32 = 0x02014b50;
    pub const SIZE: usize = 46;

    pub fn encoded_len(&self) -> usize {
        Self::SIZE + self.file_name.as_bytes().len()
    }

    pub fn write_to(&self, w: &mut ByteWriter) -> io::Result<usize> {
        w.write_u32(Self::SIGNATURE)?;
        w.write_u16(VERSION)?; // version made by
        w.write_u16(VERSION)?; // version needed to extract
        w.write_u16(0)?; // general purpose flags
        w.write_u16(self.compression_method.as_u16())?;
        w.write_u16(0)?; // last mod time
        w.write_u16(0)?; // last mod date
        w.write_u32(self.crc32)?;
        w.write_u32(self.size)?; // compressed size
        w.write_u32(self.size)?; // uncompressed size
        w.write_u16(self.file_name.len_u16())?;
        w.write_u16(0)?; // extra field length
        w.write_u16(0)?; // file comment length
        w.write_u16(0)?; // disk number start
        w.write_u16(0)?; // internal attributes
        w.write_u32(0)?; // external attributes
        w.write_u32(self.lfh_offset)?;
        w.write_bytes(self.file_name.as_bytes())
    }
}

/// End of Central Directory (EOCD) - 22 bytes, no comment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: u32 = 0x06054b50;
    pub const SIZE: usize = 22;

    pub fn write_to(&self, w: &mut ByteWriter) -> io::Result<usize> {
        w.write_u32(Self::SIGNATURE)?;
        w.write_u16(0)?; // number of this disk
        w.write_u16(0)?; // disk where the central directory starts
        w.write_u16(self.total_entries)?; // entries on this disk
        w.write_u16(self.total_entries)?;
        w.write_u32(self.cd_size)?;
        w.write_u32(self.cd_offset)?;
        w.write_u16(0) // comment length
    }
}
