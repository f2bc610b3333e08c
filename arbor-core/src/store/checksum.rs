//! Duration table checksum
//!
//! A 15-bit Fletcher-style fold: two running sums modulo 255, the first
//! seeded with a non-zero constant so that a blank (all-zero) image never
//! validates.

/// Initial value of the first accumulator
pub const CHECKSUM_SEED: u16 = 1;

/// Stored and computed checksums are compared under this mask
pub const CHECKSUM_MASK: u16 = 0x7FFF;

/// Compute the checksum of `data`
pub fn fletcher15(data: &[u8]) -> u16 {
    let mut sum1 = CHECKSUM_SEED;
    let mut sum2: u16 = 0;

    for &byte in data {
        sum1 = (sum1 + byte as u16) % 255;
        sum2 = (sum2 + sum1) % 255;
    }

    ((sum2 << 8) | sum1) & CHECKSUM_MASK
}

/// Split a checksum into its persisted bytes (high, low)
pub const fn to_bytes(checksum: u16) -> [u8; 2] {
    [(checksum >> 8) as u8, checksum as u8]
}

/// Rebuild a persisted checksum, masked to 15 bits
pub const fn from_bytes(bytes: [u8; 2]) -> u16 {
    (((bytes[0] as u16) << 8) | bytes[1] as u16) & CHECKSUM_MASK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_seed() {
        assert_eq!(fletcher15(&[]), CHECKSUM_SEED);
    }

    #[test]
    fn test_zero_table_is_not_zero() {
        assert_ne!(fletcher15(&[0u8; 160]), 0);
    }

    #[test]
    fn test_order_sensitive() {
        assert_ne!(fletcher15(&[1, 2, 3]), fletcher15(&[3, 2, 1]));
    }

    #[test]
    fn test_known_value() {
        // sum1: 1 -> 2 -> 4 ; sum2: 0 -> 2 -> 6
        assert_eq!(fletcher15(&[1, 2]), 0x0604);
    }

    #[test]
    fn test_bytes_are_masked() {
        assert_eq!(from_bytes([0xFF, 0xFF]), 0x7FFF);
        assert_eq!(from_bytes(to_bytes(0x1234)), 0x1234);
    }
}
