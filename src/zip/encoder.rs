//! Per-entry encoding: one `(name, data)` payload becomes a local record
//! (header, name, payload) and a central directory record.

use crate::error::{Error, Result};

use super::crc32::crc32;
use super::structures::{
    CentralDirectoryHeader, CompressionMethod, EntryName, LocalFileHeader,
};
use super::writer::ByteWriter;

/// A payload ready to be written as a stored ZIP entry.
///
/// Holds the validated name, the checksum and the 32-bit size, so the local
/// and central records are always produced from the same values.
#[derive(Debug)]
pub struct EntryEncoder<'a> {
    name: EntryName,
    data: &'a [u8],
    crc32: u32,
    size: u32,
}

impl<'a> EntryEncoder<'a> {
    /// Validate `name` and `data` and compute the checksum.
    ///
    /// # Errors
    ///
    /// - [`Error::NameTooLong`] if the UTF-8 name exceeds 65535 bytes.
    /// - [`Error::EntryTooLarge`] if the payload does not fit in 32 bits.
    pub fn new(name: &str, data: &'a [u8]) -> Result<Self> {
        let name = EntryName::new(name)?;
        let size = u32::try_from(data.len()).map_err(|_| Error::EntryTooLarge {
            name: name.as_str().to_string(),
            size: data.len() as u64,
        })?;

        Ok(Self {
            crc32: crc32(data),
            name,
            data,
            size,
        })
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn crc32(&self) -> u32 {
        self.crc32
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn local_header(&self) -> LocalFileHeader<'_> {
        LocalFileHeader {
            file_name: &self.name,
            compression_method: CompressionMethod::Stored,
            crc32: self.crc32,
            size: self.size,
        }
    }

    pub fn central_header(&self, lfh_offset: u32) -> CentralDirectoryHeader<'_> {
        CentralDirectoryHeader {
            file_name: &self.name,
            compression_method: CompressionMethod::Stored,
            crc32: self.crc32,
            size: self.size,
            lfh_offset,
        }
    }

    /// Both headers for an entry whose local record starts at `lfh_offset`.
    pub fn headers(
        &self,
        lfh_offset: u32,
    ) -> Result<(LocalFileHeader<'_>, CentralDirectoryHeader<'_>)> {
        let local = self.local_header();
        let central = self.central_header(lfh_offset);
        check_headers_agree(&local, &central)?;
        Ok((local, central))
    }

    /// Size of the complete local record: header, name and payload.
    pub fn local_len(&self) -> usize {
        self.local_header().encoded_len() + self.data.len()
    }

    /// Write header, name and payload. Returns the advanced position.
    pub fn write_local(&self, w: &mut ByteWriter) -> Result<usize> {
        self.local_header().write_to(w)?;
        Ok(w.write_bytes(self.data)?)
    }

    /// Write the central directory record pointing at `lfh_offset`.
    pub fn write_central(&self, w: &mut ByteWriter, lfh_offset: u32) -> Result<usize> {
        let (_, central) = self.headers(lfh_offset)?;
        Ok(central.write_to(w)?)
    }
}

/// Fail if the two copies of an entry's metadata disagree.
///
/// Readers cross-check these fields; a mismatch is a bug in this crate.
pub fn check_headers_agree(
    local: &LocalFileHeader<'_>,
    central: &CentralDirectoryHeader<'_>,
) -> Result<()> {
    let mismatch = |field| Error::HeaderMismatch {
        name: central.file_name.as_str().to_string(),
        field,
    };

    if local.file_name.len_u16() != central.file_name.len_u16()
        || local.file_name.as_bytes() != central.file_name.as_bytes()
    {
        return Err(mismatch("file name"));
    }
    if local.crc32 != central.crc32 {
        return Err(mismatch("crc32"));
    }
    if local.size != central.size {
        return Err(mismatch("size"));
    }
    if local.compression_method != central.compression_method {
        return Err(mismatch("compression method"));
    }
    Ok(())
}
