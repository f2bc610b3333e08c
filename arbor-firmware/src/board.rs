//! Board wiring and build-time configuration
//!
//! Pin assignments for the Arbor RP2040 controller:
//!
//! | Function          | GPIO |
//! |-------------------|------|
//! | EEPROM SDA / SCL  | 4 / 5 |
//! | 74HC595 DS / SHCP / STCP | 10 / 11 / 12 |
//! | Mode / Select / Increment / Clear | 13 / 14 / 15 / 16 |
//! | Speed-up switch   | 17   |

use arbor_core::config::TimingConfig;
use arbor_drivers::keypad::ButtonPanel;
use arbor_drivers::relay::ShiftRegisterRelays;
use arbor_drivers::storage::{AddressWidth, Eeprom24x, EepromConfig};
use embassy_rp::gpio::{Input, Output};
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::Delay;

mod generated {
    include!(concat!(env!("OUT_DIR"), "/stand_config.rs"));
}

pub use generated::RELAYS_ACTIVE_LOW;

/// Program store backing device
pub type Storage = Eeprom24x<I2c<'static, I2C0, Blocking>, Delay>;

/// Station relay bank
pub type Relays = ShiftRegisterRelays<Output<'static>, Output<'static>, Output<'static>>;

/// Front panel inputs
pub type Panel = ButtonPanel<Input<'static>>;

/// Timing from stand.toml
pub fn timing() -> TimingConfig {
    TimingConfig {
        unit_ms: generated::UNIT_MS,
        fast_unit_ms: generated::FAST_UNIT_MS,
        debounce_ms: generated::DEBOUNCE_MS,
    }
}

/// EEPROM part from stand.toml
pub fn eeprom() -> EepromConfig {
    EepromConfig {
        address: generated::EEPROM_ADDRESS,
        capacity: generated::EEPROM_CAPACITY,
        width: if generated::EEPROM_WIDE_ADDRESS {
            AddressWidth::Sixteen
        } else {
            AddressWidth::Eight
        },
        ..EepromConfig::c02()
    }
}
