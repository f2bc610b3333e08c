//! Safety monitor implementation

use crate::config::{MAX_CHECKPOINT, SAFETY_CEILING};

/// Safety condition status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyStatus {
    /// Run may continue
    Ok,
    /// Run has reached the elapsed-time ceiling and must stop
    CeilingReached,
}

/// Run-time ceiling check
#[derive(Debug, Clone, Copy)]
pub struct SafetyMonitor {
    /// Elapsed units at which a run is force-stopped
    ceiling: u32,
}

impl Default for SafetyMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl SafetyMonitor {
    /// Monitor with the 24-hour ceiling
    pub const fn new() -> Self {
        Self {
            ceiling: SAFETY_CEILING,
        }
    }

    /// Ceiling in elapsed units
    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Check elapsed time `ct` against the ceiling
    ///
    /// Independent of schedule contents: a run that reaches the ceiling is
    /// stopped even if stations are still due.
    pub fn check(&self, ct: u32) -> SafetyStatus {
        if ct >= self.ceiling {
            SafetyStatus::CeilingReached
        } else {
            SafetyStatus::Ok
        }
    }

    /// Whether a persisted checkpoint (6-minute units) may be resumed
    pub fn checkpoint_plausible(&self, units: u8) -> bool {
        units <= MAX_CHECKPOINT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_ceiling() {
        let monitor = SafetyMonitor::new();
        assert_eq!(monitor.check(0), SafetyStatus::Ok);
        assert_eq!(monitor.check(1439), SafetyStatus::Ok);
    }

    #[test]
    fn test_ceiling_reached() {
        let monitor = SafetyMonitor::new();
        assert_eq!(monitor.check(1440), SafetyStatus::CeilingReached);
        assert_eq!(monitor.check(u32::MAX), SafetyStatus::CeilingReached);
    }

    #[test]
    fn test_checkpoint_plausibility() {
        let monitor = SafetyMonitor::new();
        assert!(monitor.checkpoint_plausible(240));
        assert!(!monitor.checkpoint_plausible(241));
    }
}
