//! Program store
//!
//! Owns the persistent image: the checksum-guarded duration table, the run
//! record and the wear-leveled elapsed-time log. A RAM mirror of every
//! record is kept so reads never touch storage, and writes go through one
//! byte at a time, skipping bytes that already hold the target value.
//!
//! Failures of the image itself (checksum mismatch, implausible checkpoint)
//! are not errors: they self-heal and are reported through return values.
//! Only storage I/O failures surface as [`StoreError`].

pub mod checksum;
pub mod layout;
pub mod records;

pub use records::{ElapsedLog, ProgramTable, RunRecord};

use arbor_hal::{ByteStorage, StorageError};

use crate::config::{LOG_SLOTS, MAX_CHECKPOINT, PROGRAM_COUNT, STATION_COUNT, TABLE_SIZE};
use crate::program::{is_valid_station, RunSelector};
use crate::safety::SafetyMonitor;

use layout::{RUN_FLAG_OFF, RUN_FLAG_ON};

/// Errors from program store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Underlying storage failed
    Storage(StorageError),
    /// Durations cannot change while a run is active
    Running,
    /// Program, station or checkpoint value outside its range
    OutOfRange,
    /// Storage device is smaller than the image
    TooSmall,
}

impl From<StorageError> for StoreError {
    fn from(e: StorageError) -> Self {
        StoreError::Storage(e)
    }
}

/// Persistent program table, run record and elapsed-time log
pub struct ProgramStore<S> {
    storage: S,
    table: ProgramTable,
    run: RunRecord,
    log: ElapsedLog,
    stored_checksum: u16,
}

impl<S: ByteStorage> ProgramStore<S> {
    /// Load the image from storage into RAM
    ///
    /// No validation happens here; call [`Self::validate_on_boot`].
    pub fn open(mut storage: S) -> Result<Self, StoreError> {
        if storage.capacity() < layout::IMAGE_SIZE {
            return Err(StoreError::TooSmall);
        }

        let mut header = [0u8; layout::TABLE as usize];
        storage.read(0, &mut header)?;

        let mut table = [0u8; TABLE_SIZE];
        storage.read(layout::TABLE, &mut table)?;

        let mut slots = [0u8; LOG_SLOTS];
        slots.copy_from_slice(&header[layout::LOG as usize..layout::TABLE as usize]);

        Ok(Self {
            storage,
            table: ProgramTable::from_bytes(&table),
            run: RunRecord {
                running: header[layout::RUN_FLAG as usize] == RUN_FLAG_ON,
                selector: header[layout::SELECTOR as usize],
            },
            log: ElapsedLog::new(header[layout::WEAR_INDEX as usize], slots),
            stored_checksum: checksum::from_bytes([
                header[layout::CHECKSUM as usize],
                header[layout::CHECKSUM as usize + 1],
            ]),
        })
    }

    /// Stored duration count; 0 for unwritten or out-of-range locations
    pub fn read_duration(&self, program: u8, station: u8) -> u8 {
        self.table.get(program, station)
    }

    /// Change a duration
    ///
    /// Rejected while a run is active. The checksum is not updated; call
    /// [`Self::recompute_and_store_checksum`] once the edit batch is done.
    pub fn write_duration(&mut self, program: u8, station: u8, value: u8) -> Result<(), StoreError> {
        if self.run.running {
            return Err(StoreError::Running);
        }
        if !is_valid_station(station) || program as usize >= PROGRAM_COUNT {
            return Err(StoreError::OutOfRange);
        }
        if self.table.get(program, station) == value {
            return Ok(());
        }
        self.storage
            .write_byte(layout::table_addr(program, station), value)?;
        self.table.set(program, station, value);
        Ok(())
    }

    /// Recompute the table checksum and persist it
    pub fn recompute_and_store_checksum(&mut self) -> Result<u16, StoreError> {
        let sum = self.table.checksum();
        let bytes = checksum::to_bytes(sum);
        self.write_if_changed(layout::CHECKSUM, bytes[0])?;
        self.write_if_changed(layout::CHECKSUM + 1, bytes[1])?;
        self.stored_checksum = sum;
        Ok(sum)
    }

    /// Check the table against its stored checksum
    ///
    /// On mismatch the table is presumed corrupt (or blank) and the whole
    /// image is reinitialized: every duration zeroed, checksum rewritten,
    /// run flag cleared and the elapsed-time log reset to slot 0. Returns
    /// `Ok(true)` if the table was valid.
    pub fn validate_on_boot(&mut self) -> Result<bool, StoreError> {
        if self.table.checksum() == self.stored_checksum {
            return Ok(true);
        }

        // Run flag first so an interrupted reinit never resumes a run
        self.write_if_changed(layout::RUN_FLAG, RUN_FLAG_OFF)?;
        self.run.running = false;

        for program in 0..PROGRAM_COUNT as u8 {
            for station in 0..STATION_COUNT as u8 {
                self.write_if_changed(layout::table_addr(program, station), 0)?;
            }
        }
        self.table = ProgramTable::new();

        self.write_if_changed(layout::SELECTOR, 0)?;
        self.run.selector = 0;

        self.write_if_changed(layout::WEAR_INDEX, 0)?;
        for slot in 0..LOG_SLOTS as u8 {
            self.write_if_changed(layout::log_addr(slot), 0)?;
        }
        self.log.reset();

        self.recompute_and_store_checksum()?;
        Ok(false)
    }

    /// Persist the start of a run
    ///
    /// The run flag is written last: an interruption before it leaves the
    /// store idle with a fresh zeroed slot.
    pub fn start_run(&mut self, selector: RunSelector) -> Result<(), StoreError> {
        let byte = selector.to_byte();
        self.write_if_changed(layout::SELECTOR, byte)?;
        self.run.selector = byte;

        let index = self.log.advance();
        self.storage.write_byte(layout::WEAR_INDEX, index)?;
        self.write_if_changed(layout::log_addr(index), 0)?;
        self.log.set_live(0);

        self.write_if_changed(layout::RUN_FLAG, RUN_FLAG_ON)?;
        self.run.running = true;
        Ok(())
    }

    /// Persist elapsed time (6-minute units) into the live log slot
    pub fn checkpoint(&mut self, units: u8) -> Result<(), StoreError> {
        if units > MAX_CHECKPOINT {
            return Err(StoreError::OutOfRange);
        }
        self.write_if_changed(layout::log_addr(self.log.index()), units)?;
        self.log.set_live(units);
        Ok(())
    }

    /// Persist the end of a run; the log is left untouched
    pub fn stop_run(&mut self) -> Result<(), StoreError> {
        self.write_if_changed(layout::RUN_FLAG, RUN_FLAG_OFF)?;
        self.run.running = false;
        Ok(())
    }

    /// Whether a run was in progress at power loss, and how far it got
    ///
    /// A checkpoint beyond 24 h or a corrupt selector is never resumed:
    /// both yield `(false, 0)`.
    pub fn recover_elapsed_on_boot(&self) -> (bool, u8) {
        if !self.run.running || self.run.selector().is_none() {
            return (false, 0);
        }
        let units = self.log.live();
        if !SafetyMonitor::new().checkpoint_plausible(units) {
            return (false, 0);
        }
        (true, units)
    }

    /// In-memory duration table
    pub fn table(&self) -> &ProgramTable {
        &self.table
    }

    /// In-memory run record
    pub fn run_record(&self) -> RunRecord {
        self.run
    }

    /// In-memory elapsed-time log
    pub fn log(&self) -> &ElapsedLog {
        &self.log
    }

    /// Checksum as last read from or written to storage
    pub fn stored_checksum(&self) -> u16 {
        self.stored_checksum
    }

    /// Borrow the underlying storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Release the underlying storage
    pub fn into_inner(self) -> S {
        self.storage
    }

    fn write_if_changed(&mut self, addr: u16, value: u8) -> Result<(), StoreError> {
        if self.storage.read_byte(addr)? != value {
            self.storage.write_byte(addr, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_hal::MemoryStorage;
    use proptest::prelude::*;

    type Mem = MemoryStorage<256>;

    fn booted(mem: Mem) -> ProgramStore<Mem> {
        let mut store = ProgramStore::open(mem).unwrap();
        store.validate_on_boot().unwrap();
        store
    }

    fn reopen(store: ProgramStore<Mem>) -> ProgramStore<Mem> {
        ProgramStore::open(store.into_inner()).unwrap()
    }

    #[test]
    fn test_first_boot_reinitializes() {
        let mut store = ProgramStore::open(Mem::erased()).unwrap();
        assert_eq!(store.validate_on_boot(), Ok(false));
        assert!(store.table().is_empty());
        assert!(!store.run_record().running);
        assert_eq!(store.log().index(), 0);

        // Second boot is clean
        let mut store = reopen(store);
        assert_eq!(store.validate_on_boot(), Ok(true));
        assert_eq!(store.read_duration(1, 3), 0);
    }

    #[test]
    fn test_too_small_storage() {
        let result = ProgramStore::open(MemoryStorage::<64>::new());
        assert!(matches!(result, Err(StoreError::TooSmall)));
    }

    #[test]
    fn test_write_duration_visible_immediately() {
        let mut store = booted(Mem::new());
        store.write_duration(2, 4, 15).unwrap();
        assert_eq!(store.read_duration(2, 4), 15);
        assert_eq!(store.storage().bytes()[layout::table_addr(2, 4) as usize], 15);
    }

    #[test]
    fn test_write_duration_rejected_while_running() {
        let mut store = booted(Mem::new());
        store.start_run(RunSelector::All).unwrap();
        assert_eq!(store.write_duration(1, 3, 5), Err(StoreError::Running));
        assert_eq!(store.read_duration(1, 3), 0);
    }

    #[test]
    fn test_write_duration_out_of_range() {
        let mut store = booted(Mem::new());
        assert_eq!(store.write_duration(10, 3, 5), Err(StoreError::OutOfRange));
        assert_eq!(store.write_duration(1, 16, 5), Err(StoreError::OutOfRange));
    }

    #[test]
    fn test_unchanged_duration_not_rewritten() {
        let mut store = booted(Mem::new());
        let addr = layout::table_addr(1, 3) as usize;
        let before = store.storage().write_count(addr);
        store.write_duration(1, 3, 0).unwrap();
        assert_eq!(store.storage().write_count(addr), before);
    }

    #[test]
    fn test_edit_without_checksum_is_reset_on_boot() {
        let mut store = booted(Mem::new());
        store.write_duration(1, 3, 10).unwrap();

        let mut store = reopen(store);
        assert_eq!(store.validate_on_boot(), Ok(false));
        assert_eq!(store.read_duration(1, 3), 0);
    }

    #[test]
    fn test_corruption_self_heals() {
        let mut store = booted(Mem::new());
        store.write_duration(3, 5, 40).unwrap();
        store.recompute_and_store_checksum().unwrap();

        let mut mem = store.into_inner();
        let addr = layout::table_addr(3, 5) as usize;
        mem.poke(addr, 41);

        let mut store = ProgramStore::open(mem).unwrap();
        assert_eq!(store.validate_on_boot(), Ok(false));
        assert!(store.table().is_empty());
        assert_eq!(store.stored_checksum(), ProgramTable::new().checksum());

        let mut store = reopen(store);
        assert_eq!(store.validate_on_boot(), Ok(true));
    }

    #[test]
    fn test_reinit_clears_run_and_log() {
        let mut store = booted(Mem::new());
        store.start_run(RunSelector::Single(2)).unwrap();
        store.start_run(RunSelector::Single(2)).unwrap();
        store.checkpoint(12).unwrap();

        let mut mem = store.into_inner();
        mem.poke(layout::TABLE as usize, 0x55);

        let mut store = ProgramStore::open(mem).unwrap();
        assert_eq!(store.validate_on_boot(), Ok(false));
        assert_eq!(store.run_record(), RunRecord::default());
        assert_eq!(store.log().index(), 0);
        assert_eq!(store.log().live(), 0);
        assert_eq!(store.recover_elapsed_on_boot(), (false, 0));
    }

    #[test]
    fn test_reinit_skips_bytes_already_zero() {
        let store = booted(Mem::new());
        let mem = store.into_inner();
        assert_eq!(mem.write_count(layout::WEAR_INDEX as usize), 0);
        for slot in 0..LOG_SLOTS as u8 {
            assert_eq!(mem.write_count(layout::log_addr(slot) as usize), 0);
        }
        assert_eq!(mem.write_count(layout::table_addr(1, 3) as usize), 0);
    }

    #[test]
    fn test_start_run_persists_and_rotates() {
        let mut store = booted(Mem::new());
        store.start_run(RunSelector::Single(3)).unwrap();

        let bytes = *store.storage().bytes();
        assert_eq!(bytes[layout::RUN_FLAG as usize], RUN_FLAG_ON);
        assert_eq!(bytes[layout::SELECTOR as usize], 3);
        assert_eq!(bytes[layout::WEAR_INDEX as usize], 1);
        assert_eq!(store.log().live(), 0);
    }

    #[test]
    fn test_wear_leveling_visits_every_slot() {
        let mut store = booted(Mem::new());
        let mut visited = [0u8; LOG_SLOTS];
        let first = store.log().index();

        for i in 0..LOG_SLOTS {
            store.start_run(RunSelector::All).unwrap();
            let index = store.log().index();
            assert_eq!(index as usize, (first as usize + i + 1) % LOG_SLOTS);
            visited[index as usize] += 1;
            store.checkpoint(1).unwrap();
            store.stop_run().unwrap();
        }

        assert!(visited.iter().all(|&n| n == 1));
        store.start_run(RunSelector::All).unwrap();
        assert_eq!(store.log().index(), (first + 1) % LOG_SLOTS as u8);
    }

    #[test]
    fn test_checkpoint_recovered_after_power_loss() {
        let mut store = booted(Mem::new());
        store.start_run(RunSelector::Single(1)).unwrap();
        store.checkpoint(9).unwrap();

        let store = reopen(store);
        assert_eq!(store.recover_elapsed_on_boot(), (true, 9));
        assert_eq!(store.run_record().selector(), Some(RunSelector::Single(1)));
    }

    #[test]
    fn test_stop_run_keeps_log() {
        let mut store = booted(Mem::new());
        store.start_run(RunSelector::All).unwrap();
        store.checkpoint(4).unwrap();
        store.stop_run().unwrap();

        let store = reopen(store);
        assert_eq!(store.recover_elapsed_on_boot(), (false, 0));
        assert_eq!(store.log().live(), 4);
    }

    #[test]
    fn test_implausible_checkpoint_not_resumed() {
        let mut store = booted(Mem::new());
        store.start_run(RunSelector::All).unwrap();
        let slot = layout::log_addr(store.log().index()) as usize;

        let mut mem = store.into_inner();
        mem.poke(slot, 241);

        let store = ProgramStore::open(mem).unwrap();
        assert_eq!(store.recover_elapsed_on_boot(), (false, 0));
    }

    #[test]
    fn test_ceiling_checkpoint_still_resumed() {
        let mut store = booted(Mem::new());
        store.start_run(RunSelector::All).unwrap();
        store.checkpoint(MAX_CHECKPOINT).unwrap();
        assert_eq!(store.recover_elapsed_on_boot(), (true, MAX_CHECKPOINT));
        assert_eq!(store.checkpoint(241), Err(StoreError::OutOfRange));
    }

    #[test]
    fn test_corrupt_selector_not_resumed() {
        let mut store = booted(Mem::new());
        store.start_run(RunSelector::All).unwrap();

        let mut mem = store.into_inner();
        mem.poke(layout::SELECTOR as usize, 8);

        let store = ProgramStore::open(mem).unwrap();
        assert_eq!(store.recover_elapsed_on_boot(), (false, 0));
    }

    #[test]
    fn test_checkpoint_same_value_no_write() {
        let mut store = booted(Mem::new());
        store.start_run(RunSelector::All).unwrap();
        let slot = layout::log_addr(store.log().index()) as usize;
        store.checkpoint(2).unwrap();
        let writes = store.storage().write_count(slot);
        store.checkpoint(2).unwrap();
        assert_eq!(store.storage().write_count(slot), writes);
    }

    proptest! {
        #[test]
        fn prop_checksum_round_trip(
            edits in proptest::collection::vec((0u8..10, 0u8..16, any::<u8>()), 0..64)
        ) {
            let mut store = booted(Mem::new());
            for (program, station, value) in edits {
                store.write_duration(program, station, value).unwrap();
            }
            store.recompute_and_store_checksum().unwrap();
            let expected = store.table().clone();

            let mut store = reopen(store);
            prop_assert_eq!(store.validate_on_boot(), Ok(true));
            prop_assert_eq!(store.table(), &expected);
        }

        #[test]
        fn prop_single_byte_corruption_resets(
            program in 0u8..10,
            station in 0u8..16,
            value in 1u8..=80,
            flip in 1u8..=254,
        ) {
            let mut store = booted(Mem::new());
            store.write_duration(program, station, value).unwrap();
            store.recompute_and_store_checksum().unwrap();

            let addr = layout::table_addr(program, station) as usize;
            let mut mem = store.into_inner();
            let original = mem.bytes()[addr];
            // Deltas that are multiples of 255 are invisible to a mod-255 fold
            let corrupted = original.wrapping_add(flip);
            prop_assume!(corrupted as u16 % 255 != original as u16 % 255);
            mem.poke(addr, corrupted);

            let mut store = ProgramStore::open(mem).unwrap();
            prop_assert_eq!(store.validate_on_boot(), Ok(false));
            prop_assert!(store.table().is_empty());

            let mut store = reopen(store);
            prop_assert_eq!(store.validate_on_boot(), Ok(true));
        }
    }
}
