//! # stowzip
//!
//! Bundle local and remote files into a single stored (uncompressed) ZIP
//! archive, built entirely in memory.
//!
//! The ZIP writer has no dependency on a compression or archive library: it
//! computes CRC-32 itself and lays out every record byte for byte. Around it,
//! a [`Bundler`] retrieves an ordered selection of resources over HTTP or
//! from disk, skips the ones that fail, and suggests a download file name.
//!
//! ## Features
//!
//! - STORED (method 0) ZIP archives readable by any conformant reader
//! - Deterministic output: no timestamps, no reordering
//! - Concurrent, best-effort retrieval that preserves the requested order
//! - Explicit errors instead of corrupt archives past the ZIP limits
//!
//! ## Example
//!
//! ```
//! use stowzip::{ArchiveEntry, build_archive};
//!
//! let zip = build_archive(&[
//!     ArchiveEntry::new("a.csv", "1,2\n"),
//!     ArchiveEntry::new("b.csv", "3,4\n"),
//! ])?;
//! assert_eq!(&zip[0..4], b"PK\x03\x04");
//! # Ok::<(), stowzip::Error>(())
//! ```

pub mod bundle;
pub mod cli;
pub mod error;
pub mod io;
pub mod zip;

pub use bundle::{Bundle, BundleItem, BundleRequest, Bundler, Progress, Scope, SkippedItem};
pub use cli::Cli;
pub use error::{Error, Result};
pub use io::{Fetch, HttpFetcher, LocalFetcher, SourceFetcher};
pub use crate::zip::{ArchiveBuilder, ArchiveEntry, Crc32, build_archive, crc32};
