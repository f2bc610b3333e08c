//! Domain limits shared by the store, the evaluator and the UI

/// Programs addressable in the duration table (0 is the "all" selector)
pub const PROGRAM_COUNT: usize = 10;

/// Stations per program (valve outputs 0-15)
pub const STATION_COUNT: usize = 16;

/// Size of the persisted duration table
pub const TABLE_SIZE: usize = PROGRAM_COUNT * STATION_COUNT;

/// Slots in the wear-leveled elapsed-time log
pub const LOG_SLOTS: usize = 16;

/// Minutes represented by one irrigation-class count
pub const MINUTES_PER_COUNT: u32 = 6;

/// Irrigation-class cap: 80 counts of 6 minutes = 8 hours
pub const MAX_IRRIGATION_COUNTS: u8 = 80;

/// Filter-station cap in tenths of a minute
pub const MAX_FILTER_TENTHS: u8 = 250;

/// Duration increment applied by the UI, in stored counts
pub const INCREMENT_STEP: u8 = 5;

/// Runs are force-stopped once elapsed time reaches 24 hours (in elapsed units)
pub const SAFETY_CEILING: u32 = 24 * 60;

/// Elapsed units covered by one persisted checkpoint count
pub const CHECKPOINT_UNITS: u32 = MINUTES_PER_COUNT;

/// Highest plausible checkpoint (24 h in 6-minute units)
pub const MAX_CHECKPOINT: u8 = (SAFETY_CEILING / CHECKPOINT_UNITS) as u8;
