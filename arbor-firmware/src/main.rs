//! Arbor - Orchard Irrigation Stand Firmware
//!
//! Main firmware binary for RP2040-based irrigation stands: one pump, two
//! backwash filters and a bank of irrigation valves, programmed from a
//! four-button panel. Programs and run progress live in an I2C EEPROM so a
//! run picks up where it left off after a power cut.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{Config as I2cConfig, I2c};
use embassy_time::{Delay, Instant, Timer};
use {defmt_rtt as _, panic_probe as _};

use arbor_core::traits::RelayOutput;
use arbor_core::Controller;
use arbor_drivers::keypad::ButtonPanel;
use arbor_drivers::relay::ShiftRegisterRelays;
use arbor_drivers::storage::Eeprom24x;

mod board;
mod channels;
mod display;
mod tasks;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Arbor firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Relays first so every valve is latched off before anything else runs
    let data = Output::new(p.PIN_10, Level::Low);
    let clock = Output::new(p.PIN_11, Level::Low);
    let latch = Output::new(p.PIN_12, Level::Low);
    let mut relays = match ShiftRegisterRelays::new(data, clock, latch, board::RELAYS_ACTIVE_LOW) {
        Ok(relays) => relays,
        Err(e) => {
            error!("Relay bank init failed: {}", e);
            halt().await
        }
    };

    let timing = match board::timing().validate() {
        Ok(()) => board::timing(),
        Err(e) => {
            warn!("Invalid timing config ({}), using defaults", e);
            Default::default()
        }
    };

    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, I2cConfig::default());
    let storage = Eeprom24x::new(i2c, Delay, board::eeprom());

    let (controller, report) = match Controller::boot(storage, timing, Instant::now().as_millis()) {
        Ok(booted) => booted,
        Err(e) => {
            error!("Program store unavailable: {}", e);
            let _ = relays.all_off();
            halt().await
        }
    };

    if report.table_reset {
        warn!("Program table checksum mismatch, table cleared");
    }
    if let Some((selector, units)) = report.resumed {
        info!("Resuming run {} at {} x 6 min", selector, units);
    }
    if report.discarded_checkpoint {
        warn!("Interrupted run had an implausible checkpoint, not resumed");
    }

    let panel = ButtonPanel::new(
        Input::new(p.PIN_13, Pull::Up),
        Input::new(p.PIN_14, Pull::Up),
        Input::new(p.PIN_15, Pull::Up),
        Input::new(p.PIN_16, Pull::Up),
        Input::new(p.PIN_17, Pull::Up),
    );

    spawner.spawn(tasks::tick_task()).unwrap();
    spawner.spawn(tasks::keypad_task(panel)).unwrap();
    spawner
        .spawn(tasks::controller_task(controller, relays, Default::default()))
        .unwrap();

    info!("All tasks spawned");
}

/// Park after an unrecoverable init failure with outputs off
async fn halt() -> ! {
    loop {
        Timer::after_secs(1).await;
    }
}
