//! Post-step reporting
//!
//! Statistics capture, console output and detection log files are
//! collaborators outside the core. The pipeline reaches them through the
//! `Reporter` observer, which it calls only after a step has fully updated
//! buffer, set and gate state. Reporters get read-only views and return
//! nothing, so they cannot change the outcome of a step.
//!
//! ```text
//! event → validate → dedup → history → gate ──→ StepOutcome
//!                                              │
//!                                              └──→ Reporter (after)
//! ```

use alloc::vec::Vec;
use core::fmt;

use crate::dedup::write_id_list;
use crate::errors::ValidationError;
use crate::pipeline::Emission;
use crate::time::ModelTime;

/// Contents of a deduplication set at the moment it was cleared
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodReport {
    /// Boundary that was crossed
    pub boundary: ModelTime,
    /// Time of the event that crossed it
    pub triggered_at: ModelTime,
    /// Entities seen in the closed period, ascending
    pub ids: Vec<i64>,
}

impl fmt::Display for PeriodReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "period <= {} closed at {}: ", self.boundary, self.triggered_at)?;
        write_id_list(f, self.ids.iter().copied())
    }
}

/// Observer invoked after each pipeline step
///
/// All methods default to doing nothing.
pub trait Reporter {
    /// A step emitted output
    fn on_emission(&mut self, _sensor_id: i64, _emission: &Emission) {}

    /// A reporting period closed during the step
    fn on_period(&mut self, _sensor_id: i64, _report: &PeriodReport) {}

    /// An input was rejected
    fn on_rejected(&mut self, _sensor_id: i64, _error: &ValidationError) {}
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn on_emission(&mut self, sensor_id: i64, emission: &Emission) {
        (**self).on_emission(sensor_id, emission)
    }

    fn on_period(&mut self, sensor_id: i64, report: &PeriodReport) {
        (**self).on_period(sensor_id, report)
    }

    fn on_rejected(&mut self, sensor_id: i64, error: &ValidationError) {
        (**self).on_rejected(sensor_id, error)
    }
}

/// Reporter that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Reporter forwarding to the `log` facade
///
/// Emissions are logged at info as the plain detection line
/// (`"<sensor> - <time> - <ids>"`), period snapshots at debug and
/// rejections at warn.
#[cfg(feature = "log")]
#[derive(Debug, Clone, Copy)]
pub struct LogReporter {
    target: &'static str,
}

#[cfg(feature = "log")]
impl LogReporter {
    /// Log under the given target
    pub const fn new(target: &'static str) -> Self {
        Self { target }
    }
}

#[cfg(feature = "log")]
impl Default for LogReporter {
    fn default() -> Self {
        Self::new("tracecast::detections")
    }
}

#[cfg(feature = "log")]
impl Reporter for LogReporter {
    fn on_emission(&mut self, _sensor_id: i64, emission: &Emission) {
        match emission.record() {
            Some(record) => log::info!(target: self.target, "{}", record),
            None => log::info!(target: self.target, "{:?}", emission),
        }
    }

    fn on_period(&mut self, sensor_id: i64, report: &PeriodReport) {
        log::debug!(target: self.target, "sensor {}: {}", sensor_id, report);
    }

    fn on_rejected(&mut self, sensor_id: i64, error: &ValidationError) {
        log::warn!(target: self.target, "sensor {}: {}", sensor_id, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn period_report_display() {
        let report = PeriodReport {
            boundary: 2.0,
            triggered_at: 2.5,
            ids: alloc::vec![1, 3],
        };
        assert_eq!(report.to_string(), "period <= 2 closed at 2.5: [1, 3]");
    }

    #[test]
    fn reporter_through_mut_ref() {
        #[derive(Default)]
        struct Counting {
            periods: usize,
        }

        impl Reporter for Counting {
            fn on_period(&mut self, _sensor_id: i64, _report: &PeriodReport) {
                self.periods += 1;
            }
        }

        fn close_period<R: Reporter>(mut reporter: R) {
            let report = PeriodReport {
                boundary: 0.0,
                triggered_at: 1.0,
                ids: Vec::new(),
            };
            reporter.on_period(0, &report);
        }

        let mut counting = Counting::default();
        close_period(&mut counting);
        close_period(&mut counting);
        assert_eq!(counting.periods, 2);
    }
}
