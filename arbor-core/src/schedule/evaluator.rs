//! Irrigation program evaluator
//!
//! Each irrigation program is a sequence of stations run back to back in
//! ascending id order, starting at station 3 and stopping before the
//! backwash delay station. For elapsed time `ct`, the active station of a
//! program is the first one whose cumulative end time exceeds `ct`.

use crate::program::{RunSelector, StationClass, FIRST_IRRIGATION_STATION, IRRIGATION_END};
use crate::store::{ProgramStore, ProgramTable};

use super::activity::StationActivity;

use arbor_hal::ByteStorage;

/// Anything that can answer "how long does this station run in this program"
pub trait DurationSource {
    /// Stored count for `(program, station)`, 0 if unscheduled
    fn duration(&self, program: u8, station: u8) -> u8;
}

impl DurationSource for ProgramTable {
    fn duration(&self, program: u8, station: u8) -> u8 {
        self.get(program, station)
    }
}

impl<S: ByteStorage> DurationSource for ProgramStore<S> {
    fn duration(&self, program: u8, station: u8) -> u8 {
        self.read_duration(program, station)
    }
}

/// Active station of one program at `ct`, with remaining elapsed units
///
/// Returns `None` once the program's total duration is at or below `ct`.
pub fn active_station<D: DurationSource + ?Sized>(
    table: &D,
    program: u8,
    ct: u32,
) -> Option<(u8, u32)> {
    let mut cumulative: u32 = 0;
    for station in FIRST_IRRIGATION_STATION..IRRIGATION_END {
        let count = table.duration(program, station) as u32;
        cumulative += count * StationClass::of(station).tenths_per_count() / 10;
        if cumulative > ct {
            return Some((station, cumulative - ct));
        }
    }
    None
}

/// Evaluate every program covered by `selector` at elapsed time `ct`
pub fn evaluate<D: DurationSource + ?Sized>(
    table: &D,
    selector: RunSelector,
    ct: u32,
) -> StationActivity {
    let mut activity = StationActivity::new();
    for program in selector.programs() {
        if let Some((station, remaining)) = active_station(table, program, ct) {
            let tenths = remaining.saturating_mul(10).min(u16::MAX as u32) as u16;
            activity.mark(station, tenths);
        }
    }
    activity
}
