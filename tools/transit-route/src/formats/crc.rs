//! CRC-64-ISO checksum over the persisted network body

use crc::{Crc, CRC_64_GO_ISO};

const CRC64: Crc<u64> = Crc::<u64>::new(&CRC_64_GO_ISO);

/// Checksum a fully-buffered file body.
pub fn checksum(data: &[u8]) -> u64 {
    CRC64.checksum(data)
}
