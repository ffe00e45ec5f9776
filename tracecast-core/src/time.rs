//! Model time for detection streams
//!
//! Time is whatever the enclosing simulation runtime reports, as a float.
//! The core never reads a wall clock. It provides:
//! - Periodic boundaries (reporting periods)
//! - Span arithmetic between two observations

use crate::constants::INITIAL_REPORT_TIME;

/// Detection time in model time units
pub type ModelTime = f64;

/// Lazily advancing periodic boundary
///
/// The boundary only moves when an event crosses it, and then by exactly one
/// period, even if the event lies several periods ahead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicBoundary {
    next: ModelTime,
    period: ModelTime,
}

impl PeriodicBoundary {
    /// Create a boundary at `INITIAL_REPORT_TIME` advancing by `period`
    pub fn new(period: ModelTime) -> Self {
        Self {
            next: INITIAL_REPORT_TIME,
            period,
        }
    }

    /// Next boundary time
    pub fn next(&self) -> ModelTime {
        self.next
    }

    /// Period length
    pub fn period(&self) -> ModelTime {
        self.period
    }

    /// Advance past the boundary if `now` is strictly beyond it
    ///
    /// Returns the boundary that was crossed.
    pub fn cross(&mut self, now: ModelTime) -> Option<ModelTime> {
        if now > self.next {
            let crossed = self.next;
            self.next += self.period;
            Some(crossed)
        } else {
            None
        }
    }

    /// Return to the initial boundary
    pub fn rewind(&mut self) {
        self.next = INITIAL_REPORT_TIME;
    }
}

/// Time span between two observations, truncated toward zero
pub fn truncated_span(earlier: ModelTime, later: ModelTime) -> i64 {
    libm::trunc(later - earlier) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_is_strict() {
        let mut boundary = PeriodicBoundary::new(2.0);

        // Equal to the boundary does not cross
        assert_eq!(boundary.cross(0.0), None);
        assert_eq!(boundary.cross(0.5), Some(0.0));
        assert_eq!(boundary.next(), 2.0);
    }

    #[test]
    fn boundary_advances_one_period_at_a_time() {
        let mut boundary = PeriodicBoundary::new(2.0);

        // Jumping far ahead still moves by a single period
        assert_eq!(boundary.cross(9.0), Some(0.0));
        assert_eq!(boundary.cross(9.0), Some(2.0));
        assert_eq!(boundary.next(), 4.0);

        boundary.rewind();
        assert_eq!(boundary.next(), 0.0);
    }

    #[test]
    fn span_truncates_toward_zero() {
        assert_eq!(truncated_span(0.0, 10.9), 10);
        assert_eq!(truncated_span(10.9, 0.0), -10);
        assert_eq!(truncated_span(3.0, 3.4), 0);
    }
}
