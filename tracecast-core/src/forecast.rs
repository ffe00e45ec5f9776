//! Two-point linear forecasting
//!
//! ## Algorithm
//!
//! Given the two buffered observations of a stream and a lead time
//! `elapsed` measured from the newest one:
//!
//! ```text
//! span     = trunc(newest.time - oldest.time)          (integer)
//! location = newest.location + trunc(Δlocation * (elapsed / span))   per axis
//! value    = newest.value    + Δvalue * trunc(elapsed / span)
//! ```
//!
//! A span of zero (identical timestamps, or timestamps less than one unit
//! apart) means no rate can be derived, and the newest observation is
//! returned unchanged.
//!
//! ### Truncation
//!
//! The default `Truncated` precision uses an integer time span and keeps
//! an asymmetry between the two outputs: the location
//! increment is truncated after scaling, while the value ratio is truncated
//! before it. `Full` precision keeps everything in floating point and only
//! truncates the final value increment to an integer.
//!
//! ### Late events
//!
//! Spans are signed. If the newest observation carries an earlier
//! timestamp than the oldest, the rate flips sign along with the span and
//! the extrapolation still follows the direction of travel between the two
//! observations in arrival order.

use crate::buffer::HistoryBuffer;
use crate::config::ForecastPrecision;
use crate::events::{EventRecord, Location};
use crate::time::{truncated_span, ModelTime};

/// Extrapolated observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Forecast {
    /// Predicted location
    pub location: Location,
    /// Predicted value
    pub value: i64,
    /// Target time, `newest.time + elapsed`
    pub time: ModelTime,
}

/// Linear extrapolation over a pair of observations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ForecastEngine {
    precision: ForecastPrecision,
}

impl ForecastEngine {
    /// Create an engine with the given rounding policy
    pub const fn new(precision: ForecastPrecision) -> Self {
        Self { precision }
    }

    /// Rounding policy in use
    pub fn precision(&self) -> ForecastPrecision {
        self.precision
    }

    /// Forecast from a history buffer
    ///
    /// Returns `None` until the buffer holds two observations.
    pub fn forecast(&self, history: &HistoryBuffer, elapsed: ModelTime) -> Option<Forecast> {
        let (oldest, newest) = history.pair()?;
        Some(self.extrapolate(oldest, newest, elapsed))
    }

    /// Forecast from an explicit pair of observations
    pub fn extrapolate(
        &self,
        oldest: &EventRecord,
        newest: &EventRecord,
        elapsed: ModelTime,
    ) -> Forecast {
        let time = newest.time() + elapsed;

        let (location, value) = match self.precision {
            ForecastPrecision::Truncated => truncated(oldest, newest, elapsed),
            ForecastPrecision::Full => full(oldest, newest, elapsed),
        };

        Forecast {
            location,
            value,
            time,
        }
    }
}

fn truncated(oldest: &EventRecord, newest: &EventRecord, elapsed: ModelTime) -> (Location, i64) {
    let span = truncated_span(oldest.time(), newest.time());
    if span == 0 {
        return (newest.location(), newest.value());
    }

    let ratio = elapsed / span as f64;
    let delta = newest.location() - oldest.location();
    let location = newest.location() + delta.map(|d| libm::trunc(d * ratio));

    let steps = libm::trunc(ratio) as i64;
    let value_delta = newest.value().wrapping_sub(oldest.value());
    let value = newest.value().wrapping_add(value_delta.wrapping_mul(steps));

    (location, value)
}

fn full(oldest: &EventRecord, newest: &EventRecord, elapsed: ModelTime) -> (Location, i64) {
    let span = newest.time() - oldest.time();
    if span == 0.0 {
        return (newest.location(), newest.value());
    }

    let ratio = elapsed / span;
    let delta = newest.location() - oldest.location();
    let location = newest.location() + delta.map(|d| d * ratio);

    let value_delta = newest.value().wrapping_sub(oldest.value()) as f64;
    let value = newest.value().wrapping_add(libm::trunc(value_delta * ratio) as i64);

    (location, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: i64, x: f64, y: f64, time: f64) -> EventRecord {
        EventRecord::new(id, Location::new(x, y), time).unwrap()
    }

    fn history(a: EventRecord, b: EventRecord) -> HistoryBuffer {
        let mut buffer = HistoryBuffer::new();
        buffer.push(a);
        buffer.push(b);
        buffer
    }

    #[test]
    fn forward_extrapolation_from_newest() {
        let engine = ForecastEngine::default();
        let buffer = history(event(1, 0.0, 0.0, 0.0), event(1, 10.0, 0.0, 10.0));

        let forecast = engine.forecast(&buffer, 5.0).unwrap();
        assert_eq!(forecast.location, Location::new(15.0, 0.0));
        assert_eq!(forecast.value, 1);
        assert_eq!(forecast.time, 15.0);
    }

    #[test]
    fn needs_two_observations() {
        let engine = ForecastEngine::default();
        let mut buffer = HistoryBuffer::new();
        assert!(engine.forecast(&buffer, 1.0).is_none());

        buffer.push(event(1, 0.0, 0.0, 0.0));
        assert!(engine.forecast(&buffer, 1.0).is_none());
    }

    #[test]
    fn zero_span_returns_newest() {
        let engine = ForecastEngine::default();
        let buffer = history(event(1, 0.0, 0.0, 4.0), event(9, 7.0, 3.0, 4.0));

        let forecast = engine.forecast(&buffer, 10.0).unwrap();
        assert_eq!(forecast.location, Location::new(7.0, 3.0));
        assert_eq!(forecast.value, 9);
    }

    #[test]
    fn sub_unit_span_truncates_to_zero() {
        // 0.6 time units apart: integer span is 0, no extrapolation
        let engine = ForecastEngine::default();
        let buffer = history(event(1, 0.0, 0.0, 1.0), event(1, 5.0, 5.0, 1.6));

        let forecast = engine.forecast(&buffer, 3.0).unwrap();
        assert_eq!(forecast.location, Location::new(5.0, 5.0));

        // Full precision uses the real span
        let engine = ForecastEngine::new(ForecastPrecision::Full);
        let forecast = engine.forecast(&buffer, 3.0).unwrap();
        assert!((forecast.location.x - 30.0).abs() < 1e-9);
    }

    #[test]
    fn location_increment_is_truncated() {
        let engine = ForecastEngine::default();
        let buffer = history(event(1, 0.0, 0.0, 0.0), event(1, 10.0, -10.0, 3.0));

        // 10 * (5 / 3) = 16.67 -> 16, -16.67 -> -16
        let forecast = engine.forecast(&buffer, 5.0).unwrap();
        assert_eq!(forecast.location, Location::new(26.0, -26.0));
    }

    #[test]
    fn value_ratio_truncated_before_multiplying() {
        let engine = ForecastEngine::default();
        let buffer = history(event(2, 0.0, 0.0, 0.0), event(5, 0.0, 0.0, 4.0));

        // trunc(6 / 4) = 1 step of +3
        let forecast = engine.forecast(&buffer, 6.0).unwrap();
        assert_eq!(forecast.value, 8);

        // Lead shorter than the span: no whole step
        let forecast = engine.forecast(&buffer, 3.0).unwrap();
        assert_eq!(forecast.value, 5);

        // Full precision: trunc(3 * 6 / 4) = 4
        let engine = ForecastEngine::new(ForecastPrecision::Full);
        let forecast = engine.forecast(&buffer, 6.0).unwrap();
        assert_eq!(forecast.value, 9);
    }

    #[test]
    fn late_event_reverses_span() {
        let engine = ForecastEngine::default();
        // Arrived second but timestamped earlier
        let buffer = history(event(1, 0.0, 0.0, 10.0), event(1, 10.0, 0.0, 0.0));

        // span = -10, delta = +10, ratio = -0.5 -> increment -5
        let forecast = engine.forecast(&buffer, 5.0).unwrap();
        assert_eq!(forecast.location, Location::new(5.0, 0.0));
    }

    #[test]
    fn forecast_is_pure() {
        let engine = ForecastEngine::default();
        let buffer = history(event(1, 1.0, 2.0, 0.0), event(3, 4.0, 8.0, 2.0));

        assert_eq!(engine.forecast(&buffer, 7.5), engine.forecast(&buffer, 7.5));
    }
}
