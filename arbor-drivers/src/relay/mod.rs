//! Relay bank drivers

pub mod shift_register;

pub use shift_register::{ShiftRegisterError, ShiftRegisterRelays};
