//! Board-agnostic core logic for the irrigation stand firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Program store: checksum-guarded duration table and wear-leveled
//!   elapsed-time log over [`arbor_hal::ByteStorage`]
//! - Schedule evaluator for irrigation programs
//! - Backwash interleaving on the same elapsed-time axis
//! - Safety ceiling for runaway runs
//! - Button-driven control state machine and the [`Controller`] aggregate
//! - Collaborator traits (relay bank, display, keypad)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod controller;
pub mod program;
pub mod safety;
pub mod schedule;
pub mod state;
pub mod store;
pub mod traits;

pub use controller::{BootReport, Controller, TickOutcome};
pub use program::{Program, RunSelector, StationClass};
pub use store::{ProgramStore, StoreError};
