//! Error types for archive construction.
//!
//! Capacity and encoding errors abort a build immediately. Failed retrievals
//! never surface here individually: the bundler skips them and only reports
//! [`Error::EmptyArchive`] once nothing is left to archive.

use std::io;
use thiserror::Error;

/// The main error type for stowzip operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the underlying buffer writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// More entries than a ZIP without ZIP64 can index.
    #[error("Too many entries: {count} exceeds the limit of {}", u16::MAX)]
    TooManyEntries {
        /// Number of entries requested.
        count: usize,
    },

    /// A single payload does not fit in a 32-bit size field.
    #[error("Entry too large: {name} is {size} bytes, the limit is {}", u32::MAX)]
    EntryTooLarge {
        /// Archive name of the entry.
        name: String,
        /// Payload size in bytes.
        size: u64,
    },

    /// An offset or the central directory no longer fits in 32 bits.
    #[error("Archive too large: {size} bytes exceeds the 4 GiB limit")]
    ArchiveTooLarge {
        /// The size (or offset) that overflowed.
        size: u64,
    },

    /// File name longer than the 16-bit length field allows.
    #[error("File name too long: {len} bytes (limit {})", u16::MAX)]
    NameTooLong {
        /// Lossy prefix of the offending name.
        name: String,
        /// Encoded length in bytes.
        len: usize,
    },

    /// Local and central copies of an entry disagree.
    #[error("Header mismatch for {name}: {field} differs between local and central headers")]
    HeaderMismatch {
        /// Archive name of the entry.
        name: String,
        /// The field that disagreed.
        field: &'static str,
    },

    /// Every requested item failed to be retrieved.
    #[error("Nothing to archive: all {requested} requested items failed to download")]
    EmptyArchive {
        /// Number of items that were requested.
        requested: usize,
    },
}

/// Result type alias for stowzip operations.
pub type Result<T> = std::result::Result<T, Error>;
