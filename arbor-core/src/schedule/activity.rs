//! Station activity set and relay bitmask

use crate::config::STATION_COUNT;
use crate::program::{StationClass, PUMP_STATION};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Activity of a single station on the current tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StationState {
    /// Station output should be energized
    pub active: bool,
    /// Time left on this station, in tenths of an elapsed unit
    pub remaining_tenths: u16,
    /// More than one program nominated this station on the same tick
    pub contended: bool,
}

impl StationState {
    /// Remaining whole elapsed units, rounded up
    pub fn remaining_units(&self) -> u16 {
        self.remaining_tenths.div_ceil(10)
    }
}

/// Per-station activity derived from one evaluation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StationActivity {
    stations: [StationState; STATION_COUNT],
}

impl StationActivity {
    /// Nothing active
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a station active
    ///
    /// When the station is already active the larger remaining time wins
    /// and the station is flagged as contended.
    pub fn mark(&mut self, station: u8, remaining_tenths: u16) {
        let Some(state) = self.stations.get_mut(station as usize) else {
            return;
        };
        if state.active {
            state.contended = true;
            state.remaining_tenths = state.remaining_tenths.max(remaining_tenths);
        } else {
            state.active = true;
            state.remaining_tenths = remaining_tenths;
        }
    }

    /// State of one station (inactive for out-of-range ids)
    pub fn get(&self, station: u8) -> StationState {
        self.stations
            .get(station as usize)
            .copied()
            .unwrap_or_default()
    }

    /// True if any irrigation-class station is active
    pub fn any_irrigation(&self) -> bool {
        self.iter_active()
            .any(|(station, _)| StationClass::of(station).is_irrigation())
    }

    /// Active stations in ascending id order
    pub fn iter_active(&self) -> impl Iterator<Item = (u8, StationState)> + '_ {
        self.stations
            .iter()
            .enumerate()
            .filter(|(_, s)| s.active)
            .map(|(i, s)| (i as u8, *s))
    }

    /// True if any station was nominated by more than one program
    pub fn has_contention(&self) -> bool {
        self.stations.iter().any(|s| s.contended)
    }

    /// Relay bitmask; the pump bit is set when `pump` is true
    pub fn mask(&self, pump: bool) -> StationMask {
        let mut mask = StationMask::EMPTY;
        if pump {
            mask = mask.with(PUMP_STATION);
        }
        for (station, _) in self.iter_active() {
            mask = mask.with(station);
        }
        mask
    }
}

/// One bit per station id, bit 0 = pump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StationMask(pub u16);

impl StationMask {
    /// All outputs off
    pub const EMPTY: Self = Self(0);

    /// This mask with `station` set
    pub const fn with(self, station: u8) -> Self {
        if (station as usize) < STATION_COUNT {
            Self(self.0 | 1 << station)
        } else {
            self
        }
    }

    /// Whether `station` is set
    pub const fn contains(self, station: u8) -> bool {
        (station as usize) < STATION_COUNT && self.0 & (1 << station) != 0
    }

    /// Raw bits
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// No output energized
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_takes_max_and_flags_contention() {
        let mut activity = StationActivity::new();
        activity.mark(4, 100);
        assert!(!activity.has_contention());

        activity.mark(4, 300);
        activity.mark(4, 200);
        let state = activity.get(4);
        assert!(state.active);
        assert!(state.contended);
        assert_eq!(state.remaining_tenths, 300);
    }

    #[test]
    fn test_mark_out_of_range_ignored() {
        let mut activity = StationActivity::new();
        activity.mark(16, 10);
        assert_eq!(activity.iter_active().count(), 0);
        assert!(!activity.get(16).active);
    }

    #[test]
    fn test_any_irrigation_ignores_backwash() {
        let mut activity = StationActivity::new();
        activity.mark(1, 5);
        activity.mark(13, 60);
        assert!(!activity.any_irrigation());

        activity.mark(12, 60);
        assert!(activity.any_irrigation());
    }

    #[test]
    fn test_mask_with_pump() {
        let mut activity = StationActivity::new();
        activity.mark(3, 10);
        activity.mark(2, 10);

        assert_eq!(activity.mask(true).bits(), 0b1101);
        assert_eq!(activity.mask(false).bits(), 0b1100);
        assert!(activity.mask(true).contains(0));
        assert!(!StationMask::EMPTY.with(16).contains(16));
    }

    #[test]
    fn test_remaining_units_round_up() {
        let state = StationState {
            active: true,
            remaining_tenths: 5,
            contended: false,
        };
        assert_eq!(state.remaining_units(), 1);
        let state = StationState {
            remaining_tenths: 600,
            ..state
        };
        assert_eq!(state.remaining_units(), 60);
    }
}
