//! CRC-32/MPEG-2 support for SCTE-35 sections.
//!
//! The section trailer carries a CRC-32 computed with the MPEG-2 variant:
//! polynomial 0x04C11DB7, initial value 0xFFFFFFFF, no reflection, no final
//! XOR, processed MSB-first over whole bytes.

use crc::{Crc, CRC_32_MPEG_2};

const MPEG_2: Crc<u32> = Crc::<u32>::new(&CRC_32_MPEG_2);

/// Computes the CRC-32/MPEG-2 checksum of `data`.
pub fn checksum(data: &[u8]) -> u32 {
    MPEG_2.checksum(data)
}

/// Validates the trailer of a complete section: the last four bytes hold the
/// big-endian CRC of everything before them.
pub fn validate_section(buffer: &[u8]) -> bool {
    if buffer.len() < 4 {
        return false;
    }
    let (data, trailer) = buffer.split_at(buffer.len() - 4);
    let stored = u32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    checksum(data) == stored
}
