//! Collaborator traits
//!
//! These traits define the interface between the scheduling core and the
//! board's I/O adapters. The core never references pins or signal timing.

pub mod display;
pub mod relay;

pub use display::{Keypad, StatusDisplay, StatusView};
pub use relay::RelayOutput;
