//! CRC validation utilities for container checksums.
//!
//! Table-driven CRC-32 in the common reflected Ethernet/zlib variant:
//! polynomial 0x04C11DB7 (reflected 0xEDB88320), initial value all-ones,
//! final value inverted.

/// CRC algorithm specification with polynomial and initial value.
pub struct Algorithm {
    poly_reflected: u32,
    init: u32,
}

/// CRC-32 algorithm used for Ogg page checksum verification.
pub const CRC_PAGE_ALG: Algorithm = Algorithm {
    poly_reflected: 0xEDB8_8320,
    init: 0xFFFF_FFFF,
};

#[inline(always)]
const fn crc32_entry(poly: u32, index: u32) -> u32 {
    let mut value = index;
    let mut i = 0;
    while i < 8 {
        value = (value >> 1) ^ ((value & 1) * poly);
        i += 1;
    }

    value
}

#[inline(always)]
const fn crc32_table(poly: u32) -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < table.len() {
        table[i] = crc32_entry(poly, i as u32);
        i += 1;
    }

    table
}

#[derive(Debug)]
pub struct Crc32 {
    pub init: u32,
    table: [u32; 256],
}

impl Crc32 {
    pub const fn new(algorithm: &Algorithm) -> Self {
        Self {
            init: algorithm.init,
            table: crc32_table(algorithm.poly_reflected),
        }
    }

    #[inline(always)]
    pub const fn update(&self, mut crc: u32, bytes: &[u8]) -> u32 {
        let mut i = 0;

        while i < bytes.len() {
            crc = self.table[((crc ^ bytes[i] as u32) & 0xFF) as usize] ^ (crc >> 8);
            i += 1;
        }

        crc
    }

    /// One-shot checksum of `bytes` with init and final inversion applied.
    #[inline(always)]
    pub const fn checksum(&self, bytes: &[u8]) -> u32 {
        !self.update(self.init, bytes)
    }
}
