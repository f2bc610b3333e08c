//! Elapsed-time and input timing configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default elapsed unit: one minute
pub const DEFAULT_UNIT_MS: u32 = 60_000;

/// Default speed-up unit: one second per scheduled minute
pub const DEFAULT_FAST_UNIT_MS: u32 = 1_000;

/// Default post-press quiescent window
pub const DEFAULT_DEBOUNCE_MS: u32 = 250;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// An elapsed unit of zero milliseconds
    ZeroUnit,
    /// Speed-up unit is not shorter than the normal unit
    FastNotFaster,
}

/// Timing parameters for the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimingConfig {
    /// Milliseconds per elapsed unit in normal mode
    pub unit_ms: u32,
    /// Milliseconds per elapsed unit while speed-up is engaged
    pub fast_unit_ms: u32,
    /// Button presses within this window after an accepted press are ignored
    pub debounce_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            unit_ms: DEFAULT_UNIT_MS,
            fast_unit_ms: DEFAULT_FAST_UNIT_MS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl TimingConfig {
    /// Check the parameters are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unit_ms == 0 || self.fast_unit_ms == 0 {
            return Err(ConfigError::ZeroUnit);
        }
        if self.fast_unit_ms >= self.unit_ms {
            return Err(ConfigError::FastNotFaster);
        }
        Ok(())
    }

    /// Milliseconds per elapsed unit for the given speed mode
    pub fn unit_for(&self, fast: bool) -> u32 {
        let unit = if fast { self.fast_unit_ms } else { self.unit_ms };
        unit.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(TimingConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_zero_unit_rejected() {
        let config = TimingConfig {
            fast_unit_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroUnit));
        // Never divides by zero even when unvalidated
        assert_eq!(config.unit_for(true), 1);
    }

    #[test]
    fn test_fast_must_be_faster() {
        let config = TimingConfig {
            unit_ms: 1_000,
            fast_unit_ms: 1_000,
            debounce_ms: 0,
        };
        assert_eq!(config.validate(), Err(ConfigError::FastNotFaster));
    }

    #[test]
    fn test_unit_for() {
        let config = TimingConfig::default();
        assert_eq!(config.unit_for(false), 60_000);
        assert_eq!(config.unit_for(true), 1_000);
    }
}
