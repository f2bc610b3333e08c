//! Run state
//!
//! Only one run exists system-wide. Elapsed time is tracked as a base value
//! plus the milliseconds since the last rebase, so changing the unit length
//! (speed-up) keeps `ct` continuous.

use crate::config::CHECKPOINT_UNITS;
use crate::program::RunSelector;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopReason {
    /// Operator pressed clear/stop
    Manual,
    /// No irrigation station left active
    Completed,
    /// Elapsed time reached the 24-hour ceiling
    SafetyCeiling,
}

/// An in-progress run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActiveRun {
    /// Programs covered by this run
    pub selector: RunSelector,
    /// Elapsed units accumulated before `since_ms`
    base_units: u32,
    /// Reference instant of the current unit length
    since_ms: u64,
    /// Last persisted checkpoint (6-minute units)
    checkpoint: u8,
}

impl ActiveRun {
    /// A run starting at `now_ms`
    pub const fn start(selector: RunSelector, now_ms: u64) -> Self {
        Self {
            selector,
            base_units: 0,
            since_ms: now_ms,
            checkpoint: 0,
        }
    }

    /// A run recovered from a persisted checkpoint
    pub const fn resume(selector: RunSelector, checkpoint: u8, now_ms: u64) -> Self {
        Self {
            selector,
            base_units: checkpoint as u32 * CHECKPOINT_UNITS,
            since_ms: now_ms,
            checkpoint,
        }
    }

    /// Elapsed units at `now_ms` for a unit of `unit_ms`
    pub fn elapsed(&self, now_ms: u64, unit_ms: u32) -> u32 {
        let since = now_ms.saturating_sub(self.since_ms) / unit_ms.max(1) as u64;
        let since = u32::try_from(since).unwrap_or(u32::MAX);
        self.base_units.saturating_add(since)
    }

    /// Fold the time elapsed under `old_unit_ms` into the base
    ///
    /// The partial unit in progress carries over as the same fraction of
    /// `new_unit_ms`, so repeated toggles never discard progress.
    pub fn rebase(&mut self, now_ms: u64, old_unit_ms: u32, new_unit_ms: u32) {
        let old = old_unit_ms.max(1) as u64;
        let rem = now_ms.saturating_sub(self.since_ms) % old;
        self.base_units = self.elapsed(now_ms, old_unit_ms);
        self.since_ms = now_ms.saturating_sub(rem * new_unit_ms as u64 / old);
    }

    /// Last persisted checkpoint
    pub fn checkpoint(&self) -> u8 {
        self.checkpoint
    }

    pub(crate) fn set_checkpoint(&mut self, units: u8) {
        self.checkpoint = units;
    }
}

/// System run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunState {
    /// Nothing running, outputs off
    #[default]
    Idle,
    /// Schedule being evaluated
    Running(ActiveRun),
}

impl RunState {
    /// Check if a run is in progress
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running(_))
    }

    /// The active run, if any
    pub fn active(&self) -> Option<&ActiveRun> {
        match self {
            RunState::Running(run) => Some(run),
            RunState::Idle => None,
        }
    }
}
