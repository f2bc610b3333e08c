//! Status output over RTT
//!
//! The stand has no screen of its own yet; the status view is logged over
//! defmt whenever it changes so a probe shows what a panel would.

use arbor_core::traits::{StatusDisplay, StatusView};
use core::convert::Infallible;
use defmt::*;

/// Logs changed status views
#[derive(Default)]
pub struct RttDisplay {
    last: Option<StatusView>,
}

impl StatusDisplay for RttDisplay {
    type Error = Infallible;

    fn show(&mut self, view: &StatusView) -> Result<(), Infallible> {
        if self.last.as_ref() == Some(view) {
            return Ok(());
        }
        if view.running {
            info!(
                "run {} t={} fast={}",
                view.selector.to_byte(),
                view.elapsed,
                view.fast
            );
            for (station, remaining) in view.active_stations() {
                info!("  station {}: {} left", station, remaining);
            }
        } else {
            info!(
                "panel P{} S{} D{} sel={}",
                view.program,
                view.station,
                view.duration,
                view.selector.to_byte()
            );
        }
        self.last = Some(view.clone());
        Ok(())
    }
}
