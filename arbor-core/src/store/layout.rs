//! Persistent byte layout
//!
//! ```text
//! ┌──────────┬──────────┬─────────┬────────────┬──────────────┬───────────────────┐
//! │ CHECKSUM │ SELECTOR │ RUNNING │ WEAR INDEX │ ELAPSED LOG  │ DURATION TABLE    │
//! │ 2B (BE)  │ 1B       │ 1B      │ 1B         │ 16B          │ 10 x 16 = 160B    │
//! └──────────┴──────────┴─────────┴────────────┴──────────────┴───────────────────┘
//! ```
//!
//! The table is row-major: program `p`, station `s` lives at
//! `TABLE + p * 16 + s`.

use crate::config::{LOG_SLOTS, STATION_COUNT, TABLE_SIZE};

/// Checksum, high byte (sum2) first
pub const CHECKSUM: u16 = 0;

/// Selector of the last started run
pub const SELECTOR: u16 = 2;

/// Run-state flag
pub const RUN_FLAG: u16 = 3;

/// Live slot of the elapsed-time log
pub const WEAR_INDEX: u16 = 4;

/// First elapsed-time log slot
pub const LOG: u16 = 5;

/// First duration table entry
pub const TABLE: u16 = LOG + LOG_SLOTS as u16;

/// Bytes occupied by the whole image
pub const IMAGE_SIZE: usize = TABLE as usize + TABLE_SIZE;

/// Run flag value meaning "a run was in progress"
pub const RUN_FLAG_ON: u8 = 1;

/// Run flag value meaning "idle"
pub const RUN_FLAG_OFF: u8 = 0;

/// Address of a duration table entry
pub const fn table_addr(program: u8, station: u8) -> u16 {
    TABLE + program as u16 * STATION_COUNT as u16 + station as u16
}

/// Address of an elapsed-time log slot
pub const fn log_addr(slot: u8) -> u16 {
    LOG + (slot as u16 % LOG_SLOTS as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_offsets() {
        assert_eq!(TABLE, 21);
        assert_eq!(IMAGE_SIZE, 181);
        assert_eq!(table_addr(0, 0), 21);
        assert_eq!(table_addr(9, 15), 180);
        assert_eq!(log_addr(15), 20);
        assert_eq!(log_addr(16), LOG);
    }
}
