//! Typed views of the persisted image
//!
//! These records mirror the byte layout in [`super::layout`] so the rest of
//! the core never touches raw offsets.

use crate::config::{LOG_SLOTS, PROGRAM_COUNT, STATION_COUNT, TABLE_SIZE};
use crate::program::RunSelector;

use super::checksum::fletcher15;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Program/station duration table
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProgramTable {
    entries: [[u8; STATION_COUNT]; PROGRAM_COUNT],
}

impl Default for ProgramTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramTable {
    /// All-zero table (nothing scheduled)
    pub const fn new() -> Self {
        Self {
            entries: [[0; STATION_COUNT]; PROGRAM_COUNT],
        }
    }

    /// Decode from the persisted row-major bytes
    pub fn from_bytes(bytes: &[u8; TABLE_SIZE]) -> Self {
        let mut table = Self::new();
        for (row, chunk) in table.entries.iter_mut().zip(bytes.chunks_exact(STATION_COUNT)) {
            row.copy_from_slice(chunk);
        }
        table
    }

    /// Encode to the persisted row-major bytes
    pub fn to_bytes(&self) -> [u8; TABLE_SIZE] {
        let mut bytes = [0u8; TABLE_SIZE];
        for (chunk, row) in bytes.chunks_exact_mut(STATION_COUNT).zip(self.entries.iter()) {
            chunk.copy_from_slice(row);
        }
        bytes
    }

    /// Stored count, 0 for out-of-range ids
    pub fn get(&self, program: u8, station: u8) -> u8 {
        self.entries
            .get(program as usize)
            .and_then(|row| row.get(station as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Set a count; returns false for out-of-range ids
    pub fn set(&mut self, program: u8, station: u8, value: u8) -> bool {
        match self
            .entries
            .get_mut(program as usize)
            .and_then(|row| row.get_mut(station as usize))
        {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Checksum over all entries
    pub fn checksum(&self) -> u16 {
        fletcher15(&self.to_bytes())
    }

    /// True when no station of any program is scheduled
    pub fn is_empty(&self) -> bool {
        self.entries.iter().flatten().all(|&d| d == 0)
    }
}

/// Persisted run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunRecord {
    /// A run was active at the last persisted change
    pub running: bool,
    /// Raw selector byte of the last started run
    pub selector: u8,
}

impl RunRecord {
    /// Decoded selector, `None` if the byte is corrupt
    pub fn selector(&self) -> Option<RunSelector> {
        RunSelector::from_byte(self.selector)
    }
}

/// Wear-leveled elapsed-time log
///
/// Exactly one slot is live; the index advances once per run start so
/// checkpoint writes rotate over all slots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElapsedLog {
    index: u8,
    slots: [u8; LOG_SLOTS],
}

impl ElapsedLog {
    /// Build from persisted bytes; an out-of-range index is folded back
    pub fn new(index: u8, slots: [u8; LOG_SLOTS]) -> Self {
        Self {
            index: index % LOG_SLOTS as u8,
            slots,
        }
    }

    /// Live slot index
    pub fn index(&self) -> u8 {
        self.index
    }

    /// Value in the live slot (6-minute units)
    pub fn live(&self) -> u8 {
        self.slots[self.index as usize]
    }

    /// Value in an arbitrary slot
    pub fn slot(&self, index: u8) -> u8 {
        self.slots[index as usize % LOG_SLOTS]
    }

    /// Move to the next slot and return its index
    pub(crate) fn advance(&mut self) -> u8 {
        self.index = (self.index + 1) % LOG_SLOTS as u8;
        self.index
    }

    pub(crate) fn set_live(&mut self, value: u8) {
        self.slots[self.index as usize] = value;
    }

    pub(crate) fn reset(&mut self) {
        self.index = 0;
        self.slots = [0; LOG_SLOTS];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_bytes_are_row_major() {
        let mut table = ProgramTable::new();
        assert!(table.set(1, 3, 10));
        assert!(table.set(9, 13, 2));

        let bytes = table.to_bytes();
        assert_eq!(bytes[16 + 3], 10);
        assert_eq!(bytes[9 * 16 + 13], 2);
        assert_eq!(ProgramTable::from_bytes(&bytes), table);
    }

    #[test]
    fn test_table_out_of_range() {
        let mut table = ProgramTable::new();
        assert!(!table.set(10, 0, 1));
        assert!(!table.set(0, 16, 1));
        assert_eq!(table.get(10, 0), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_log_rotation() {
        let mut log = ElapsedLog::new(15, [0; LOG_SLOTS]);
        assert_eq!(log.advance(), 0);
        log.set_live(7);
        assert_eq!(log.live(), 7);
        assert_eq!(log.slot(0), 7);
    }

    #[test]
    fn test_log_index_folded() {
        let log = ElapsedLog::new(0xFF, [0; LOG_SLOTS]);
        assert_eq!(log.index(), 15);
    }

    #[test]
    fn test_run_record_selector() {
        let record = RunRecord {
            running: true,
            selector: 7,
        };
        assert_eq!(record.selector(), None);
    }
}
