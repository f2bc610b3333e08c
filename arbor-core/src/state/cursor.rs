//! Panel cursor and button transitions
//!
//! The cursor is either on the run screen (program 0) or editing one
//! station of one program. Pending duration edits live in the cursor until
//! the operator moves off the station, at which point they are committed.

use crate::program::{next_duration, Program, RunSelector};
use crate::schedule::DurationSource;

use super::events::Button;

/// Side effect requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// Nothing to persist
    None,
    /// Persist a duration; `seal` recomputes the table checksum afterwards
    Commit {
        program: u8,
        station: u8,
        duration: u8,
        seal: bool,
    },
    /// Start a run with this selector
    StartRun(RunSelector),
    /// Stop the active run
    StopRun,
}

/// Panel cursor: `(program, station, duration)` plus the run selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursor {
    program: Option<Program>,
    station: u8,
    duration: u8,
    selector: RunSelector,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

impl Cursor {
    /// Run screen, "all programs" selected
    pub const fn new() -> Self {
        Self {
            program: None,
            station: 0,
            duration: 0,
            selector: RunSelector::All,
        }
    }

    /// Program being edited, `None` on the run screen
    pub fn program(&self) -> Option<Program> {
        self.program
    }

    /// Program number shown on the panel (0 on the run screen)
    pub fn program_number(&self) -> u8 {
        self.program.map(Program::number).unwrap_or(0)
    }

    /// Station under the cursor
    pub fn station(&self) -> u8 {
        self.station
    }

    /// Pending duration for the station under the cursor
    pub fn duration(&self) -> u8 {
        self.duration
    }

    /// Run selector offered on the run screen
    pub fn selector(&self) -> RunSelector {
        self.selector
    }

    /// Check if a program is being edited
    pub fn is_editing(&self) -> bool {
        self.program.is_some()
    }

    /// Process a button press and return the next cursor
    ///
    /// While a run is active only clear/stop does anything; editing is not
    /// reachable until the run ends.
    pub fn press<D: DurationSource + ?Sized>(
        self,
        button: Button,
        running: bool,
        table: &D,
    ) -> (Self, Effect) {
        use Button::*;

        if running {
            let effect = match button {
                Clear => Effect::StopRun,
                _ => Effect::None,
            };
            return (self, effect);
        }

        match (self.program, button) {
            (None, Mode) => (self.enter(Program::Irrigation(1), table), Effect::None),
            (None, Select) => (
                Self {
                    selector: self.selector.next(),
                    ..self
                },
                Effect::None,
            ),
            (None, Increment) => (self, Effect::StartRun(self.selector)),
            (None, Clear) => (self, Effect::None),

            (Some(program), Mode) => {
                let next = match program.next() {
                    Some(next) => self.enter(next, table),
                    None => Self {
                        program: None,
                        station: 0,
                        duration: 0,
                        ..self
                    },
                };
                (next, self.commit(program, true))
            }
            (Some(program), Select) => {
                let station = program.next_station(self.station);
                let next = Self {
                    station,
                    duration: table.duration(program.number(), station),
                    ..self
                };
                (next, self.commit(program, false))
            }
            (Some(_), Increment) => (
                Self {
                    duration: next_duration(self.station, self.duration),
                    ..self
                },
                Effect::None,
            ),
            (Some(_), Clear) => (Self { duration: 0, ..self }, Effect::None),
        }
    }

    fn enter<D: DurationSource + ?Sized>(self, program: Program, table: &D) -> Self {
        let station = program.first_station();
        Self {
            program: Some(program),
            station,
            duration: table.duration(program.number(), station),
            ..self
        }
    }

    fn commit(&self, program: Program, seal: bool) -> Effect {
        Effect::Commit {
            program: program.number(),
            station: self.station,
            duration: self.duration,
            seal,
        }
    }
}
