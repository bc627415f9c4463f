//! CRC-32 (ISO 3309 / ITU-T V.42), the checksum ZIP stores per entry.
//!
//! Readers recompute this value for every stored entry and reject the
//! archive when it disagrees, so the reflected, table-driven form below is
//! the only acceptable one: polynomial `0xEDB88320`, initial value
//! `0xFFFFFFFF`, final inversion.

use std::sync::OnceLock;

/// Reflected CRC-32 polynomial.
const POLYNOMIAL: u32 = 0xEDB8_8320;

/// Lookup table, built on first use and shared by the whole process.
static TABLE: OnceLock<[u32; 256]> = OnceLock::new();

fn table() -> &'static [u32; 256] {
    TABLE.get_or_init(|| {
        let mut table = [0u32; 256];
        for (n, slot) in table.iter_mut().enumerate() {
            let mut c = n as u32;
            for _ in 0..8 {
                c = if c & 1 != 0 { POLYNOMIAL ^ (c >> 1) } else { c >> 1 };
            }
            *slot = c;
        }
        table
    })
}

/// Compute the CRC-32 of a byte slice held entirely in memory.
///
/// Total and deterministic; the checksum of an empty slice is `0`.
pub fn crc32(data: &[u8]) -> u32 {
    Crc32::new().update(data).finalize()
}

/// Incremental CRC-32 hasher.
///
/// Feeding a payload in any number of chunks yields the same value as
/// [`crc32`] over the concatenation.
#[derive(Debug, Clone, Copy)]
pub struct Crc32 {
    state: u32,
}

impl Crc32 {
    pub fn new() -> Self {
        Self { state: 0xFFFF_FFFF }
    }

    /// Fold `data` into the running checksum.
    pub fn update(mut self, data: &[u8]) -> Self {
        let table = table();
        self.state = data.iter().fold(self.state, |c, &b| {
            (c >> 8) ^ table[((c ^ u32::from(b)) & 0xFF) as usize]
        });
        self
    }

    pub fn finalize(self) -> u32 {
        !self.state
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}
