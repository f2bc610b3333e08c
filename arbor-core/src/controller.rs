//! Controller coordinating store, schedule, backwash and panel
//!
//! The controller is the single owner of all mutable state:
//! - Applies button presses through the panel cursor
//! - Starts, stops and resumes runs against the program store
//! - Re-evaluates the schedule once per elapsed-time tick
//! - Enforces the safety ceiling
//! - Produces the relay mask and the status view
//!
//! It is a plain value driven by a host loop with millisecond timestamps,
//! so the same code runs on hardware and in tests.

use arbor_hal::ByteStorage;

use crate::config::{TimingConfig, CHECKPOINT_UNITS, MAX_CHECKPOINT, STATION_COUNT};
use crate::program::RunSelector;
use crate::safety::{SafetyMonitor, SafetyStatus};
use crate::schedule::{evaluate, Backwash, StationActivity, StationMask};
use crate::state::{ActiveRun, Button, Cursor, Effect, PanelInput, RunState, StopReason};
use crate::store::{ProgramStore, StoreError};
use crate::traits::StatusView;

/// What boot found in storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootReport {
    /// Checksum mismatch: the table was reinitialized to zero
    pub table_reset: bool,
    /// A run was resumed at this checkpoint (6-minute units)
    pub resumed: Option<(RunSelector, u8)>,
    /// A run flag was set but its checkpoint or selector was implausible
    pub discarded_checkpoint: bool,
}

/// Result of one [`Controller::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// No run active
    Idle,
    /// Elapsed time has not changed since the last evaluation
    Unchanged,
    /// Schedule re-evaluated at this elapsed time
    Evaluated(u32),
    /// The run ended on this tick
    Stopped(StopReason),
}

/// Single owner of the irrigation stand's state
pub struct Controller<S> {
    store: ProgramStore<S>,
    config: TimingConfig,
    safety: SafetyMonitor,
    cursor: Cursor,
    run: RunState,
    backwash: Backwash,
    activity: StationActivity,
    /// Elapsed time of the last evaluation; gates re-evaluation
    last_tick: Option<u32>,
    /// Timestamp of the last accepted button press
    last_press_ms: Option<u64>,
    last_stop: Option<StopReason>,
    fast: bool,
}

impl<S: ByteStorage> Controller<S> {
    /// Open storage, validate it and resume an interrupted run
    pub fn boot(storage: S, config: TimingConfig, now_ms: u64) -> Result<(Self, BootReport), StoreError> {
        let mut store = ProgramStore::open(storage)?;
        let mut report = BootReport {
            table_reset: !store.validate_on_boot()?,
            ..Default::default()
        };

        let flagged = store.run_record().running;
        let (was_running, units) = store.recover_elapsed_on_boot();
        let selector = store.run_record().selector();

        let run = match (was_running, selector) {
            (true, Some(selector)) => {
                report.resumed = Some((selector, units));
                RunState::Running(ActiveRun::resume(selector, units, now_ms))
            }
            _ => {
                if flagged {
                    store.stop_run()?;
                    report.discarded_checkpoint = true;
                }
                RunState::Idle
            }
        };

        Ok((
            Self {
                store,
                config,
                safety: SafetyMonitor::new(),
                cursor: Cursor::new(),
                run,
                backwash: Backwash::new(),
                activity: StationActivity::new(),
                last_tick: None,
                last_press_ms: None,
                last_stop: None,
                fast: false,
            },
            report,
        ))
    }

    /// Apply a panel input
    ///
    /// Returns the effect that was carried out, or `None` if a button press
    /// fell inside the debounce window.
    pub fn handle_input(&mut self, input: PanelInput, now_ms: u64) -> Result<Option<Effect>, StoreError> {
        match input {
            PanelInput::Press(button) => self.press(button, now_ms),
            PanelInput::SpeedUp(fast) => {
                self.set_fast(fast, now_ms);
                Ok(Some(Effect::None))
            }
        }
    }

    /// Apply a button press
    pub fn press(&mut self, button: Button, now_ms: u64) -> Result<Option<Effect>, StoreError> {
        if let Some(last) = self.last_press_ms {
            if now_ms.saturating_sub(last) < self.config.debounce_ms as u64 {
                return Ok(None);
            }
        }
        self.last_press_ms = Some(now_ms);

        let (cursor, effect) = self
            .cursor
            .press(button, self.run.is_running(), &self.store);
        self.cursor = cursor;

        match effect {
            Effect::None => {}
            Effect::Commit {
                program,
                station,
                duration,
                seal,
            } => {
                self.store.write_duration(program, station, duration)?;
                if seal {
                    self.store.recompute_and_store_checksum()?;
                }
            }
            Effect::StartRun(selector) => self.start_run(selector, now_ms)?,
            Effect::StopRun => self.stop_run(StopReason::Manual)?,
        }

        Ok(Some(effect))
    }

    /// Engage or release speed-up
    ///
    /// An active run is rebased so elapsed time stays continuous across the
    /// unit change.
    pub fn set_fast(&mut self, fast: bool, now_ms: u64) {
        if fast == self.fast {
            return;
        }
        let old_unit = self.config.unit_for(self.fast);
        let new_unit = self.config.unit_for(fast);
        if let RunState::Running(run) = &mut self.run {
            run.rebase(now_ms, old_unit, new_unit);
        }
        self.fast = fast;
    }

    /// Poll the schedule
    ///
    /// Cheap when elapsed time has not advanced; otherwise re-evaluates,
    /// interleaves backwash, enforces the ceiling and persists a checkpoint
    /// when the 6-minute count changes.
    pub fn tick(&mut self, now_ms: u64) -> Result<TickOutcome, StoreError> {
        let RunState::Running(run) = self.run else {
            return Ok(TickOutcome::Idle);
        };

        let ct = run.elapsed(now_ms, self.config.unit_for(self.fast));
        if self.last_tick == Some(ct) {
            return Ok(TickOutcome::Unchanged);
        }
        self.last_tick = Some(ct);

        if self.safety.check(ct) == SafetyStatus::CeilingReached {
            self.stop_run(StopReason::SafetyCeiling)?;
            return Ok(TickOutcome::Stopped(StopReason::SafetyCeiling));
        }

        let mut activity = evaluate(self.store.table(), run.selector, ct);
        let irrigating = activity.any_irrigation();
        if !irrigating {
            self.stop_run(StopReason::Completed)?;
            return Ok(TickOutcome::Stopped(StopReason::Completed));
        }

        if let Some((station, remaining)) = self.backwash.step(self.store.table(), ct, irrigating) {
            activity.mark(station, remaining);
        }
        self.activity = activity;

        let units = (ct / CHECKPOINT_UNITS).min(MAX_CHECKPOINT as u32) as u8;
        if units != run.checkpoint() {
            self.store.checkpoint(units)?;
            if let RunState::Running(active) = &mut self.run {
                active.set_checkpoint(units);
            }
        }

        Ok(TickOutcome::Evaluated(ct))
    }

    /// Relay mask for the current state; pump on whenever a run is active
    pub fn outputs(&self) -> StationMask {
        if self.run.is_running() {
            self.activity.mask(true)
        } else {
            StationMask::EMPTY
        }
    }

    /// Snapshot for the display
    pub fn view(&self, now_ms: u64) -> StatusView {
        let mut remaining = [0u16; STATION_COUNT];
        if self.run.is_running() {
            for (station, state) in self.activity.iter_active() {
                remaining[station as usize] = state.remaining_units();
            }
        }

        let active = self.run.active();
        StatusView {
            program: self.cursor.program_number(),
            station: self.cursor.station(),
            duration: self.cursor.duration(),
            running: active.is_some(),
            selector: active.map(|r| r.selector).unwrap_or(self.cursor.selector()),
            fast: self.fast,
            elapsed: self.elapsed(now_ms).unwrap_or(0),
            remaining,
        }
    }

    /// Elapsed units of the active run
    pub fn elapsed(&self, now_ms: u64) -> Option<u32> {
        self.run
            .active()
            .map(|run| run.elapsed(now_ms, self.config.unit_for(self.fast)))
    }

    /// Check if a run is active
    pub fn is_running(&self) -> bool {
        self.run.is_running()
    }

    /// Current run state
    pub fn run_state(&self) -> RunState {
        self.run
    }

    /// Current panel cursor
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Station activity from the last evaluation
    pub fn activity(&self) -> &StationActivity {
        &self.activity
    }

    /// Backwash cycle state
    pub fn backwash(&self) -> &Backwash {
        &self.backwash
    }

    /// Why the most recent run ended
    pub fn last_stop(&self) -> Option<StopReason> {
        self.last_stop
    }

    /// Check if speed-up is engaged
    pub fn is_fast(&self) -> bool {
        self.fast
    }

    /// The program store
    pub fn store(&self) -> &ProgramStore<S> {
        &self.store
    }

    /// Release the underlying storage
    pub fn into_storage(self) -> S {
        self.store.into_inner()
    }

    fn start_run(&mut self, selector: RunSelector, now_ms: u64) -> Result<(), StoreError> {
        self.store.start_run(selector)?;
        self.run = RunState::Running(ActiveRun::start(selector, now_ms));
        self.backwash = Backwash::new();
        self.activity = StationActivity::new();
        self.last_tick = None;
        Ok(())
    }

    fn stop_run(&mut self, reason: StopReason) -> Result<(), StoreError> {
        // Outputs go dark even if persisting the stop fails
        self.run = RunState::Idle;
        self.last_stop = Some(reason);
        self.activity = StationActivity::new();
        self.last_tick = None;
        self.store.stop_run()
    }
}
