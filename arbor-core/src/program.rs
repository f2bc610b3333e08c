//! Programs, stations and station classes
//!
//! A program is a view over one row of the duration table. Programs 1-5
//! irrigate, program 9 describes the filter backwash cycle. Program number 0
//! is never a schedule: as a run selector it means "run all irrigation
//! programs".

use heapless::Vec;

use crate::config::{
    INCREMENT_STEP, MAX_FILTER_TENTHS, MAX_IRRIGATION_COUNTS, MINUTES_PER_COUNT, STATION_COUNT,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pump output, on whenever a run is active
pub const PUMP_STATION: u8 = 0;

/// Backwash filter valves, in cycle order
pub const FILTER_STATIONS: [u8; 2] = [1, 2];

/// Backwash delay pseudo-station (time between backwash cycles)
pub const DELAY_STATION: u8 = 0xD;

/// First station walked by the irrigation evaluator
pub const FIRST_IRRIGATION_STATION: u8 = 3;

/// Irrigation walk stops before this station
pub const IRRIGATION_END: u8 = DELAY_STATION;

/// Number of the backwash program in the duration table
pub const BACKWASH_PROGRAM: u8 = 9;

/// Highest irrigation program number
pub const MAX_IRRIGATION_PROGRAM: u8 = 5;

/// Stations editable from the panel for irrigation programs
const IRRIGATION_EDIT_STATIONS: [u8; 5] = [3, 4, 5, 6, 7];

/// Stations editable from the panel for the backwash program
const BACKWASH_EDIT_STATIONS: [u8; 3] = [1, 2, DELAY_STATION];

/// Station class, each with its own duration unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StationClass {
    /// Station 0
    Pump,
    /// Stations 1 and 2, counted in tenths of a minute
    Filter,
    /// Stations 3-12, counted in 6-minute units (8-12 are expansion)
    Irrigation,
    /// Station 13, counted in 6-minute units
    BackwashDelay,
    /// Stations 14 and 15
    Unused,
}

impl StationClass {
    /// Classify a station id
    pub const fn of(station: u8) -> Self {
        match station {
            0 => StationClass::Pump,
            1 | 2 => StationClass::Filter,
            3..=12 => StationClass::Irrigation,
            DELAY_STATION => StationClass::BackwashDelay,
            _ => StationClass::Unused,
        }
    }

    /// Tenths of an elapsed unit represented by one stored count
    pub const fn tenths_per_count(self) -> u32 {
        match self {
            StationClass::Filter => 1,
            StationClass::Irrigation | StationClass::BackwashDelay => MINUTES_PER_COUNT * 10,
            StationClass::Pump | StationClass::Unused => 0,
        }
    }

    /// Largest count the panel will store before wrapping to zero
    pub const fn max_count(self) -> u8 {
        match self {
            StationClass::Filter => MAX_FILTER_TENTHS,
            StationClass::Irrigation | StationClass::BackwashDelay => MAX_IRRIGATION_COUNTS,
            StationClass::Pump | StationClass::Unused => 0,
        }
    }

    /// Whether this class counts toward "irrigation active"
    pub const fn is_irrigation(self) -> bool {
        matches!(self, StationClass::Irrigation)
    }
}

/// Next duration offered by the increment button
///
/// Moves to the next multiple of [`INCREMENT_STEP`] and wraps to zero once
/// the station class cap is passed.
pub fn next_duration(station: u8, current: u8) -> u8 {
    let step = INCREMENT_STEP as u16;
    let next = (current as u16 / step + 1) * step;
    let cap = StationClass::of(station).max_count() as u16;
    if next > cap {
        0
    } else {
        next as u8
    }
}

/// A schedulable program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Program {
    /// Irrigation program 1-5
    Irrigation(u8),
    /// Filter backwash program (9)
    Backwash,
}

impl Program {
    /// Parse a program number; 0 and unassigned numbers yield `None`
    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1..=MAX_IRRIGATION_PROGRAM => Some(Program::Irrigation(number)),
            BACKWASH_PROGRAM => Some(Program::Backwash),
            _ => None,
        }
    }

    /// Row number in the duration table
    pub const fn number(self) -> u8 {
        match self {
            Program::Irrigation(n) => n,
            Program::Backwash => BACKWASH_PROGRAM,
        }
    }

    /// Stations the panel cycles through when editing this program
    pub fn edit_stations(self) -> &'static [u8] {
        match self {
            Program::Irrigation(_) => &IRRIGATION_EDIT_STATIONS,
            Program::Backwash => &BACKWASH_EDIT_STATIONS,
        }
    }

    /// First station shown when entering this program
    pub fn first_station(self) -> u8 {
        self.edit_stations()[0]
    }

    /// Station after `station` in the edit cycle
    ///
    /// A station outside the editable range restarts the cycle.
    pub fn next_station(self, station: u8) -> u8 {
        let stations = self.edit_stations();
        match stations.iter().position(|&s| s == station) {
            Some(i) => stations[(i + 1) % stations.len()],
            None => stations[0],
        }
    }

    /// Program selected after this one by the mode button
    ///
    /// `None` means the panel returns to the run screen (program 0).
    pub const fn next(self) -> Option<Self> {
        match self {
            Program::Irrigation(n) if n < MAX_IRRIGATION_PROGRAM => Some(Program::Irrigation(n + 1)),
            Program::Irrigation(_) => Some(Program::Backwash),
            Program::Backwash => None,
        }
    }
}

/// Which programs a run covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RunSelector {
    /// Programs 1-5 concurrently
    #[default]
    All,
    /// A single irrigation program
    Single(u8),
}

impl RunSelector {
    /// Decode the persisted selector byte
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(RunSelector::All),
            1..=MAX_IRRIGATION_PROGRAM => Some(RunSelector::Single(byte)),
            _ => None,
        }
    }

    /// Encode for persistence and display
    pub const fn to_byte(self) -> u8 {
        match self {
            RunSelector::All => 0,
            RunSelector::Single(n) => n,
        }
    }

    /// Selector offered after this one: all, 1, 2, ... 5, all
    pub const fn next(self) -> Self {
        match self {
            RunSelector::All => RunSelector::Single(1),
            RunSelector::Single(n) if n < MAX_IRRIGATION_PROGRAM => RunSelector::Single(n + 1),
            RunSelector::Single(_) => RunSelector::All,
        }
    }

    /// Irrigation program numbers covered by this selector
    pub fn programs(self) -> Vec<u8, { MAX_IRRIGATION_PROGRAM as usize }> {
        let mut programs = Vec::new();
        match self {
            RunSelector::All => {
                for n in 1..=MAX_IRRIGATION_PROGRAM {
                    let _ = programs.push(n);
                }
            }
            RunSelector::Single(n) => {
                let _ = programs.push(n);
            }
        }
        programs
    }
}

/// Check a station id fits the table
pub const fn is_valid_station(station: u8) -> bool {
    (station as usize) < STATION_COUNT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_classes() {
        assert_eq!(StationClass::of(0), StationClass::Pump);
        assert_eq!(StationClass::of(2), StationClass::Filter);
        assert_eq!(StationClass::of(3), StationClass::Irrigation);
        assert_eq!(StationClass::of(12), StationClass::Irrigation);
        assert_eq!(StationClass::of(13), StationClass::BackwashDelay);
        assert_eq!(StationClass::of(14), StationClass::Unused);
        assert!(!StationClass::BackwashDelay.is_irrigation());
    }

    #[test]
    fn test_irrigation_increment_wraps_past_eight_hours() {
        assert_eq!(next_duration(3, 0), 5);
        assert_eq!(next_duration(3, 7), 10);
        assert_eq!(next_duration(3, 75), 80);
        assert_eq!(next_duration(3, 80), 0);
        assert_eq!(next_duration(DELAY_STATION, 80), 0);
    }

    #[test]
    fn test_filter_increment_is_half_minute() {
        assert_eq!(next_duration(1, 0), 5);
        assert_eq!(next_duration(2, 245), 250);
        assert_eq!(next_duration(2, 250), 0);
        assert_eq!(next_duration(14, 0), 0);
    }

    #[test]
    fn test_program_cycle() {
        let mut program = Program::Irrigation(1);
        let mut seen = [0u8; 6];
        for slot in seen.iter_mut() {
            *slot = program.number();
            match program.next() {
                Some(next) => program = next,
                None => break,
            }
        }
        assert_eq!(seen, [1, 2, 3, 4, 5, 9]);
        assert_eq!(Program::Backwash.next(), None);
    }

    #[test]
    fn test_edit_station_cycles() {
        let p = Program::Irrigation(2);
        assert_eq!(p.next_station(3), 4);
        assert_eq!(p.next_station(7), 3);
        assert_eq!(p.next_station(0), 3);

        let b = Program::Backwash;
        assert_eq!(b.first_station(), 1);
        assert_eq!(b.next_station(1), 2);
        assert_eq!(b.next_station(2), DELAY_STATION);
        assert_eq!(b.next_station(DELAY_STATION), 1);
    }

    #[test]
    fn test_program_numbers() {
        assert_eq!(Program::from_number(0), None);
        assert_eq!(Program::from_number(6), None);
        assert_eq!(Program::from_number(9), Some(Program::Backwash));
        assert_eq!(Program::from_number(4).map(Program::number), Some(4));
    }

    #[test]
    fn test_selector_cycle_and_bytes() {
        assert_eq!(RunSelector::All.next(), RunSelector::Single(1));
        assert_eq!(RunSelector::Single(5).next(), RunSelector::All);
        assert_eq!(RunSelector::from_byte(3), Some(RunSelector::Single(3)));
        assert_eq!(RunSelector::from_byte(6), None);
        assert_eq!(RunSelector::All.programs().as_slice(), &[1, 2, 3, 4, 5]);
        assert_eq!(RunSelector::Single(2).programs().as_slice(), &[2]);
    }
}
