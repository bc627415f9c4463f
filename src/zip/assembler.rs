//! Archive assembly: local records, then the central directory, then the
//! End of Central Directory record.
//!
//! Offsets are positional. Entries are written in the order they were
//! added, and the central directory repeats that order exactly.

use log::debug;

use crate::error::{Error, Result};

use super::encoder::EntryEncoder;
use super::structures::{
    CentralDirectoryHeader, EndOfCentralDirectory, LocalFileHeader, PLACEHOLDER_NAME,
};
use super::writer::ByteWriter;

/// Maximum number of entries without ZIP64.
pub const MAX_ENTRIES: usize = u16::MAX as usize;

/// A named payload to be stored in an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Vec<u8>,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Size of a complete local record (header, name, payload) for `name`.
pub fn local_entry_size(name: &str, data_len: usize) -> usize {
    LocalFileHeader::SIZE + stored_name_len(name) + data_len
}

/// Size of a central directory record for `name`.
pub fn central_entry_size(name: &str) -> usize {
    CentralDirectoryHeader::SIZE + stored_name_len(name)
}

fn stored_name_len(name: &str) -> usize {
    if name.is_empty() {
        PLACEHOLDER_NAME.len()
    } else {
        name.len()
    }
}

/// Serialize `entries`, in order, into a stored ZIP archive.
///
/// An empty slice yields the 22-byte archive holding only the End of
/// Central Directory record.
///
/// # Errors
///
/// Fails without producing output if the archive would need ZIP64 (more than
/// 65535 entries, a payload of 4 GiB or more, or offsets past 4 GiB), or if a
/// file name is longer than 65535 bytes.
pub fn build_archive(entries: &[ArchiveEntry]) -> Result<Vec<u8>> {
    if entries.len() > MAX_ENTRIES {
        return Err(Error::TooManyEntries {
            count: entries.len(),
        });
    }

    let mut builder = ArchiveBuilder::new();
    for entry in entries {
        builder.add(&entry.name, &entry.data)?;
    }
    builder.finish()
}

/// Incremental archive builder.
///
/// Capacity limits are checked as entries are added, so an oversized
/// selection fails before any bytes are assembled.
#[derive(Debug, Default)]
pub struct ArchiveBuilder<'a> {
    entries: Vec<EntryEncoder<'a>>,
    /// Total size of the local records added so far.
    local_size: u64,
}

impl<'a> ArchiveBuilder<'a> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            local_size: 0,
        }
    }

    /// Number of entries added so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry after all previously added ones.
    pub fn add(&mut self, name: &str, data: &'a [u8]) -> Result<&mut Self> {
        if self.entries.len() >= MAX_ENTRIES {
            return Err(Error::TooManyEntries {
                count: self.entries.len() + 1,
            });
        }

        // The new record starts at the current end of the local section.
        to_u32(self.local_size)?;

        let entry = EntryEncoder::new(name, data)?;
        self.local_size += entry.local_len() as u64;
        self.entries.push(entry);
        Ok(self)
    }

    /// Emit `[local records] ++ [central directory] ++ [EOCD]`.
    pub fn finish(self) -> Result<Vec<u8>> {
        let cd_offset = to_u32(self.local_size)?;
        let cd_len: usize = self
            .entries
            .iter()
            .map(|e| e.central_header(0).encoded_len())
            .sum();
        let cd_size = to_u32(cd_len as u64)?;
        let total_entries =
            u16::try_from(self.entries.len()).map_err(|_| Error::TooManyEntries {
                count: self.entries.len(),
            })?;

        let capacity = self.local_size as usize + cd_len + EndOfCentralDirectory::SIZE;
        let mut out = ByteWriter::with_capacity(capacity);
        let mut offsets = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            let offset = to_u32(out.position() as u64)?;
            debug!(
                "storing {} ({} bytes, crc32 {:08x}) at offset {}",
                entry.name(),
                entry.size(),
                entry.crc32(),
                offset
            );
            offsets.push(offset);
            entry.write_local(&mut out)?;
        }
        debug_assert_eq!(out.position() as u64, self.local_size);

        let mut directory = ByteWriter::with_capacity(cd_len);
        for (entry, &offset) in self.entries.iter().zip(&offsets) {
            entry.write_central(&mut directory, offset)?;
        }
        debug_assert_eq!(directory.position(), cd_len);
        out.append(directory);

        EndOfCentralDirectory {
            total_entries,
            cd_size,
            cd_offset,
        }
        .write_to(&mut out)?;

        debug_assert_eq!(out.position(), capacity);
        Ok(out.into_inner())
    }
}

fn to_u32(size: u64) -> Result<u32> {
    u32::try_from(size).map_err(|_| Error::ArchiveTooLarge { size })
}
