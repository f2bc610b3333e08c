//! Relay bank output

use crate::schedule::StationMask;

/// Drives one relay per station from a bitmask
///
/// Implementations must be idempotent: the controller re-applies the same
/// mask every loop iteration.
pub trait RelayOutput {
    /// Error from the underlying I/O
    type Error;

    /// Energize exactly the stations set in `mask`
    fn apply(&mut self, mask: StationMask) -> Result<(), Self::Error>;

    /// De-energize every output
    fn all_off(&mut self) -> Result<(), Self::Error> {
        self.apply(StationMask::EMPTY)
    }
}
