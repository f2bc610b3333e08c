//! Relay bank behind chained 74HC595 shift registers
//!
//! Two chained registers give one output per station id. Bits are clocked
//! out MSB first so station `n` lands on output `Qn` counting from the
//! register nearest the MCU, then latched in one step so relays never see
//! a partially shifted pattern.

use arbor_core::config::STATION_COUNT;
use arbor_core::schedule::StationMask;
use arbor_core::traits::RelayOutput;
use embedded_hal::digital::{OutputPin, PinState};

/// Which pin failed while shifting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShiftRegisterError {
    /// Serial data (DS)
    Data,
    /// Shift clock (SHCP)
    Clock,
    /// Storage latch (STCP)
    Latch,
}

/// Shift-register relay bank
pub struct ShiftRegisterRelays<D, C, L> {
    data: D,
    clock: C,
    latch: L,
    /// If true, relay ON = output LOW (common on opto-isolated boards)
    inverted: bool,
    /// Mask currently latched, `None` until the first successful apply
    applied: Option<StationMask>,
}

impl<D: OutputPin, C: OutputPin, L: OutputPin> ShiftRegisterRelays<D, C, L> {
    /// Create the driver and latch every relay off
    pub fn new(data: D, clock: C, latch: L, inverted: bool) -> Result<Self, ShiftRegisterError> {
        let mut relays = Self {
            data,
            clock,
            latch,
            inverted,
            applied: None,
        };
        relays.clock.set_low().map_err(|_| ShiftRegisterError::Clock)?;
        relays.latch.set_low().map_err(|_| ShiftRegisterError::Latch)?;
        relays.all_off()?;
        Ok(relays)
    }

    /// Relay board with active-high inputs
    pub fn new_active_high(data: D, clock: C, latch: L) -> Result<Self, ShiftRegisterError> {
        Self::new(data, clock, latch, false)
    }

    /// Relay board with active-low inputs
    pub fn new_active_low(data: D, clock: C, latch: L) -> Result<Self, ShiftRegisterError> {
        Self::new(data, clock, latch, true)
    }

    /// Mask currently latched on the outputs
    pub fn applied(&self) -> Option<StationMask> {
        self.applied
    }

    /// Release the pins
    pub fn release(self) -> (D, C, L) {
        (self.data, self.clock, self.latch)
    }

    fn shift_out(&mut self, bits: u16) -> Result<(), ShiftRegisterError> {
        for bit in (0..STATION_COUNT).rev() {
            let level = PinState::from(bits & (1 << bit) != 0);
            self.data.set_state(level).map_err(|_| ShiftRegisterError::Data)?;
            self.clock.set_high().map_err(|_| ShiftRegisterError::Clock)?;
            self.clock.set_low().map_err(|_| ShiftRegisterError::Clock)?;
        }
        self.latch.set_high().map_err(|_| ShiftRegisterError::Latch)?;
        self.latch.set_low().map_err(|_| ShiftRegisterError::Latch)
    }
}

impl<D: OutputPin, C: OutputPin, L: OutputPin> RelayOutput for ShiftRegisterRelays<D, C, L> {
    type Error = ShiftRegisterError;

    fn apply(&mut self, mask: StationMask) -> Result<(), Self::Error> {
        if self.applied == Some(mask) {
            return Ok(());
        }

        let bits = if self.inverted { !mask.bits() } else { mask.bits() };
        // Forget the latched state until the new pattern is fully out
        self.applied = None;
        self.shift_out(bits)?;
        self.applied = Some(mask);
        Ok(())
    }
}
