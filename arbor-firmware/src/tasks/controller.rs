//! Main controller task
//!
//! Owns the controller, the relay bank and the status display. Applies
//! panel inputs as they arrive, evaluates the schedule on every tick and
//! drives the relays from the result.

use defmt::*;
use embassy_futures::select::{select, Either};

use arbor_core::state::Effect;
use arbor_core::traits::{RelayOutput, StatusDisplay};
use arbor_core::{Controller, StoreError, TickOutcome};

use crate::board::{Relays, Storage};
use crate::channels::INPUT_CHANNEL;
use crate::display::RttDisplay;
use crate::tasks::tick::TICK_SIGNAL;

/// Controller task - main coordination loop
#[embassy_executor::task]
pub async fn controller_task(
    mut controller: Controller<Storage>,
    mut relays: Relays,
    mut display: RttDisplay,
) {
    info!("Controller task started");

    let mut last_mask = None;

    loop {
        let now = match select(INPUT_CHANNEL.receive(), TICK_SIGNAL.wait()).await {
            Either::First((input, at)) => {
                match controller.handle_input(input, at) {
                    Ok(Some(effect)) => log_effect(effect),
                    Ok(None) => trace!("Press inside debounce window: {}", input),
                    Err(e) => log_store_error(e),
                }
                at
            }
            Either::Second(now) => {
                match controller.tick(now) {
                    Ok(TickOutcome::Stopped(reason)) => info!("Run stopped: {}", reason),
                    Ok(TickOutcome::Evaluated(ct)) => {
                        if controller.activity().has_contention() {
                            debug!("Station contention at t={}", ct);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => log_store_error(e),
                }
                now
            }
        };

        let mask = controller.outputs();
        if last_mask != Some(mask) {
            debug!("Stations: {=u16:#b}", mask.bits());
            last_mask = Some(mask);
        }
        if let Err(e) = relays.apply(mask) {
            error!("Relay update failed: {}", e);
        }
        let _ = display.show(&controller.view(now));
    }
}

fn log_effect(effect: Effect) {
    match effect {
        Effect::None => {}
        Effect::Commit {
            program,
            station,
            duration,
            seal,
        } => {
            debug!("P{} S{} <- {}", program, station, duration);
            if seal {
                info!("Program {} saved", program);
            }
        }
        Effect::StartRun(selector) => info!("Run started: {}", selector),
        Effect::StopRun => info!("Run stopped by operator"),
    }
}

fn log_store_error(e: StoreError) {
    match e {
        StoreError::Running => warn!("Edit rejected while running"),
        other => error!("Program store error: {}", other),
    }
}
