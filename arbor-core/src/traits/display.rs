//! Display and keypad
//!
//! The panel is a passive view plus an input source: it renders a
//! [`StatusView`] and reports raw input edges. No UI state lives on that
//! side.

use crate::config::STATION_COUNT;
use crate::program::RunSelector;
use crate::state::PanelInput;

/// Everything the panel renders
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusView {
    /// Program under the cursor (0 = run screen)
    pub program: u8,
    /// Station under the cursor
    pub station: u8,
    /// Pending duration for that station (stored counts)
    pub duration: u8,
    /// A run is active
    pub running: bool,
    /// Selector offered on the run screen, or the selector of the active run
    pub selector: RunSelector,
    /// Speed-up engaged
    pub fast: bool,
    /// Elapsed units of the active run
    pub elapsed: u32,
    /// Remaining elapsed units per station, 0 when inactive
    pub remaining: [u16; STATION_COUNT],
}

impl StatusView {
    /// Stations with time remaining, ascending
    pub fn active_stations(&self) -> impl Iterator<Item = (u8, u16)> + '_ {
        self.remaining
            .iter()
            .enumerate()
            .filter(|&(_, &r)| r > 0)
            .map(|(i, &r)| (i as u8, r))
    }
}

/// Renders the status view
pub trait StatusDisplay {
    /// Error from the display link
    type Error;

    /// Draw `view`; called whenever it may have changed
    fn show(&mut self, view: &StatusView) -> Result<(), Self::Error>;
}

/// Source of raw panel input edges
pub trait Keypad {
    /// Next pending input, if any; never blocks
    fn poll(&mut self) -> Option<PanelInput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_stations() {
        let mut remaining = [0u16; STATION_COUNT];
        remaining[3] = 12;
        remaining[1] = 1;
        let view = StatusView {
            program: 0,
            station: 0,
            duration: 0,
            running: true,
            selector: RunSelector::All,
            fast: false,
            elapsed: 0,
            remaining,
        };
        let active: Vec<_> = view.active_stations().collect();
        assert_eq!(active, vec![(1, 1), (3, 12)]);
    }
}
