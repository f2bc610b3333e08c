//! Panel input drivers

pub mod buttons;

pub use buttons::ButtonPanel;
