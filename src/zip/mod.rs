//! Stored ZIP archive construction.
//!
//! This module turns an ordered list of named payloads into a complete ZIP
//! byte stream, entirely in memory and without compression.
//!
//! ## Architecture
//!
//! - [`crc32`]: CRC-32 checksum with a lazily built, process-wide table
//! - [`writer`]: little-endian cursor over an owned buffer
//! - [`structures`]: the fixed-layout records (local header, central header, EOCD)
//! - [`encoder`]: one payload to its local and central records
//! - [`assembler`]: offset bookkeeping and the final concatenation
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers followed by the data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! ## Limitations
//!
//! - STORED (method 0) only, no compression
//! - No ZIP64: at most 65535 entries and 4 GiB
//! - No timestamps, permissions, comments or extra fields
//! - No encryption, no multi-disk archives

pub mod assembler;
pub mod crc32;
pub mod encoder;
pub mod structures;
pub mod writer;

pub use assembler::{
    ArchiveBuilder, ArchiveEntry, MAX_ENTRIES, build_archive, central_entry_size,
    local_entry_size,
};
pub use crc32::{Crc32, crc32};
pub use encoder::EntryEncoder;
pub use structures::*;
pub use writer::ByteWriter;
