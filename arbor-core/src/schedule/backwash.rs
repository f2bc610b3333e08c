//! Filter backwash interleaving
//!
//! Backwash runs as a second cycle over the run's elapsed-time axis, gated
//! on irrigation: while no irrigation station is active it is idle and its
//! reference is held. A cycle is filter 1, filter 2, then the backwash delay,
//! accumulated from the reference `bt`; when `ct` passes the whole cycle the
//! reference moves to `ct + 1` and the next tick starts a fresh pass.
//!
//! Filter stages are counted in tenths of a unit and compared against
//! `ct * 10`, so half-unit filter durations carry into the next stage
//! instead of being truncated away on every cycle.

use crate::program::{StationClass, BACKWASH_PROGRAM, DELAY_STATION, FILTER_STATIONS};

use super::evaluator::DurationSource;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stage order within one backwash cycle
pub const CYCLE: [u8; 3] = [FILTER_STATIONS[0], FILTER_STATIONS[1], DELAY_STATION];

/// Ticks of irrigation activity before the first cycle starts
pub const STARTUP_DELAY_TICKS: u8 = 1;

/// Backwash cycle state for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Backwash {
    /// Start of the current cycle on the elapsed axis (`bt`)
    reference: u32,
    /// Irrigation ticks still to skip before cycling
    startup_delay: u8,
}

impl Default for Backwash {
    fn default() -> Self {
        Self::new()
    }
}

impl Backwash {
    /// Fresh state for a newly started or resumed run
    pub const fn new() -> Self {
        Self {
            reference: 0,
            startup_delay: STARTUP_DELAY_TICKS,
        }
    }

    /// Current cycle reference `bt`
    pub fn reference(&self) -> u32 {
        self.reference
    }

    /// Whether the startup delay is still pending
    pub fn is_delaying(&self) -> bool {
        self.startup_delay > 0
    }

    /// Advance to elapsed time `ct`
    ///
    /// Returns the single active backwash station and its remaining time in
    /// tenths of a unit, or `None` when idle, delaying or between cycles.
    pub fn step<D: DurationSource + ?Sized>(
        &mut self,
        table: &D,
        ct: u32,
        irrigating: bool,
    ) -> Option<(u8, u16)> {
        if !irrigating {
            return None;
        }

        if self.startup_delay > 0 {
            self.startup_delay -= 1;
            self.reference = ct.saturating_add(1);
            return None;
        }

        let now = ct.saturating_mul(10);
        let mut threshold = self.reference.saturating_mul(10);
        for station in CYCLE {
            let count = table.duration(BACKWASH_PROGRAM, station) as u32;
            threshold = threshold.saturating_add(count * StationClass::of(station).tenths_per_count());
            if threshold > now {
                let remaining = (threshold - now).min(u16::MAX as u32) as u16;
                return Some((station, remaining));
            }
        }

        self.reference = ct.saturating_add(1);
        None
    }
}
