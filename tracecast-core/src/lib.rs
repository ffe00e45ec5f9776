//! Core correlation engine for Tracecast
//!
//! Keeps a short rolling history per detection stream so that it can:
//! - deduplicate entities seen within a reporting period
//! - emit a normalized detection record on every accepted event
//! - extrapolate an entity's next position from its two latest observations
//!
//! Key constraints:
//! - One pipeline per stream, one synchronous step per event
//! - No I/O and no blocking in the step
//! - Fixed-size history, no allocation on the buffer path
//!
//! ```rust
//! use tracecast_core::{CorrelationConfig, CorrelationPipeline, RawDetection, StepOutcome};
//!
//! let mut pipeline = CorrelationPipeline::new(CorrelationConfig::default()).unwrap();
//!
//! pipeline.ingest(&RawDetection::new(1, &[0.0, 0.0], 0.0));
//! let outcome = pipeline.ingest(&RawDetection::new(1, &[10.0, 0.0], 10.0));
//! assert!(matches!(outcome, StepOutcome::Emitted(_)));
//!
//! let forecast = pipeline.forecast_at(5.0).unwrap();
//! assert_eq!(forecast.location.x, 15.0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

// Optional logging, compiled out without the `log` feature
#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

pub mod buffer;
pub mod config;
pub mod constants;
pub mod dedup;
pub mod errors;
pub mod events;
pub mod forecast;
pub mod gate;
pub mod hub;
pub mod pipeline;
pub mod report;
pub mod time;

// Public API
pub use buffer::HistoryBuffer;
pub use config::{ChannelFlags, CorrelationConfig, ForecastPrecision};
pub use dedup::DedupSet;
pub use errors::{
    ConfigError, ConfigResult, CorrelationError, CorrelationResult, PreconditionError,
    ValidationError, ValidationResult,
};
pub use events::{DetectionRecord, EventRecord, Location, RawDetection};
pub use forecast::{Forecast, ForecastEngine};
pub use gate::WindowGate;
pub use hub::CorrelationHub;
pub use pipeline::{
    ChannelValue, CorrelationPipeline, Emission, PipelineState, PipelineStats, StepOutcome,
    SuppressReason,
};
pub use report::{NullReporter, PeriodReport, Reporter};

#[cfg(feature = "log")]
pub use report::LogReporter;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
