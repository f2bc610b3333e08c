//! Persistent storage drivers

pub mod eeprom;

pub use eeprom::{AddressWidth, Eeprom24x, EepromConfig};
