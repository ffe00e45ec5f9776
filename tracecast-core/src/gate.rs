//! Emission throttling
//!
//! Limits how often a pipeline actually emits, relative to how often it is
//! fired. Unlike a token bucket this is purely count-based: one emission
//! every `threshold` calls, independent of model time.
//!
//! ## Example
//! ```rust
//! use tracecast_core::gate::WindowGate;
//!
//! let mut gate = WindowGate::with_threshold(3);
//! let pattern: Vec<bool> = (0..7).map(|_| gate.tick()).collect();
//! assert_eq!(pattern, [false, false, true, false, false, true, false]);
//! ```

use crate::constants::MIN_GATE_THRESHOLD;
use crate::errors::{ConfigError, ConfigResult};

/// Counter-based emission gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGate {
    /// Calls since the last emission
    counter: u32,
    /// Calls per emission, at least 1
    threshold: u32,
}

impl WindowGate {
    /// Create a gate from an integer threshold
    ///
    /// Thresholds below 1 are raised to 1.
    pub const fn with_threshold(threshold: u32) -> Self {
        let threshold = if threshold < MIN_GATE_THRESHOLD {
            MIN_GATE_THRESHOLD
        } else {
            threshold
        };

        Self {
            counter: 0,
            threshold,
        }
    }

    /// Create a gate from a configured time window
    ///
    /// The counter is compared against the window as an integer, so the
    /// effective threshold is `floor(time_window)`, clamped to at least 1.
    pub fn from_window(time_window: f64) -> ConfigResult<Self> {
        if !time_window.is_finite() || time_window < 0.0 {
            return Err(ConfigError::InvalidTimeWindow { value: time_window });
        }

        let floored = libm::floor(time_window);
        let threshold = if floored >= u32::MAX as f64 {
            u32::MAX
        } else {
            floored as u32
        };

        Ok(Self::with_threshold(threshold))
    }

    /// Count one call, returning true if this call may emit
    pub fn tick(&mut self) -> bool {
        self.counter += 1;

        if self.counter >= self.threshold {
            self.counter = 0;
            true
        } else {
            false
        }
    }

    /// Calls since the last emission
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Effective threshold
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Forget pending calls
    pub fn reset(&mut self) {
        self.counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_three_pattern() {
        let mut gate = WindowGate::with_threshold(3);
        let emitted: alloc::vec::Vec<usize> = (1..=7).filter(|_| gate.tick()).collect();

        // Calls 3 and 6 only
        assert_eq!(emitted, alloc::vec![3, 6]);
        assert_eq!(gate.counter(), 1);
    }

    #[test]
    fn threshold_one_always_emits() {
        let mut gate = WindowGate::with_threshold(1);
        assert!((0..5).all(|_| gate.tick()));
    }

    #[test]
    fn window_is_floored() {
        assert_eq!(WindowGate::from_window(3.9).unwrap().threshold(), 3);
        assert_eq!(WindowGate::from_window(1.0).unwrap().threshold(), 1);
    }

    #[test]
    fn sub_unit_window_clamps_to_one() {
        // Default window of 0.5 emits on every call
        let gate = WindowGate::from_window(0.5).unwrap();
        assert_eq!(gate.threshold(), 1);

        assert_eq!(WindowGate::with_threshold(0).threshold(), 1);
    }

    #[test]
    fn invalid_windows_rejected() {
        assert!(matches!(
            WindowGate::from_window(-1.0),
            Err(ConfigError::InvalidTimeWindow { .. })
        ));
        assert!(WindowGate::from_window(f64::NAN).is_err());
        assert!(WindowGate::from_window(f64::INFINITY).is_err());
    }

    #[test]
    fn reset_clears_pending_calls() {
        let mut gate = WindowGate::with_threshold(2);
        assert!(!gate.tick());
        gate.reset();
        assert!(!gate.tick());
        assert!(gate.tick());
    }
}
