//! Error Types for Detection Correlation
//!
//! ## Design Philosophy
//!
//! Errors are returned from the per-event hot path, so they follow the same
//! rules as the rest of the core:
//!
//! 1. **Small Size**: every variant carries at most a couple of scalars.
//!
//! 2. **No Heap Allocation**: messages are `&'static str`, never `String`.
//!
//! 3. **Copy Semantics**: errors can be stored in outcomes and statistics
//!    without cloning.
//!
//! ## Error Categories
//!
//! ### Per-Event Input
//! - `ValidationError`: malformed detection (wrong location arity, negative
//!   or non-finite time). The event is rejected, pipeline state is untouched.
//!
//! ### Query Preconditions
//! - `PreconditionError`: a forecast was requested before two observations
//!   were buffered. No partial result is produced.
//!
//! ### Construction
//! - `ConfigError`: a configuration parameter is outside its valid domain.
//!
//! Numeric edge cases such as two observations sharing a timestamp are not
//! errors; the forecast engine handles them by policy.
//!
//! ```rust
//! use tracecast_core::{CorrelationConfig, CorrelationPipeline, RawDetection, StepOutcome, ValidationError};
//!
//! let mut pipeline = CorrelationPipeline::new(CorrelationConfig::default()).unwrap();
//!
//! match pipeline.ingest(&RawDetection::new(7, &[1.0], 0.0)) {
//!     StepOutcome::Rejected(ValidationError::LocationArity { found }) => assert_eq!(found, 1),
//!     other => panic!("unexpected outcome: {:?}", other),
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for input validation
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for configuration checks
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for pipeline and hub queries
pub type CorrelationResult<T> = Result<T, CorrelationError>;

/// Malformed detection input
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ValidationError {
    /// Location does not have exactly two components
    #[error("Input is malformed: location has {found} entries, expected 2")]
    LocationArity {
        /// Number of components actually supplied
        found: usize,
    },

    /// Detection time is before the start of the stream
    #[error("Detection time {time} is negative")]
    NegativeTime {
        /// The offending timestamp
        time: f64,
    },

    /// Detection time is NaN or infinite
    #[error("Detection time is not a finite number")]
    NonFiniteTime,

    /// A location coordinate is NaN or infinite
    #[error("Location component {axis} is not a finite number")]
    NonFiniteLocation {
        /// Index of the bad component (0 = x, 1 = y)
        axis: usize,
    },

    /// Forecast lead time is NaN or infinite
    #[error("Forecast lead time is not a finite number")]
    NonFiniteLeadTime,
}

/// Forecast requested without enough history
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreconditionError {
    /// Not enough buffered observations to extrapolate
    #[error("Insufficient history: need {required} observations, have {available}")]
    InsufficientHistory {
        /// Observations needed for a forecast
        required: usize,
        /// Observations currently buffered
        available: usize,
    },
}

/// Invalid configuration parameter
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Time window is negative, NaN or infinite
    #[error("Invalid time window {value}: must be a finite, non-negative number")]
    InvalidTimeWindow {
        /// Rejected value
        value: f64,
    },

    /// Forecast lead time is negative, NaN or infinite
    #[error("Invalid forecast lead time {value}: must be a finite, non-negative number")]
    InvalidForecastLead {
        /// Rejected value
        value: f64,
    },

    /// Report period must advance the boundary
    #[error("Invalid report period: must be at least 1")]
    ZeroReportPeriod,

    /// No output channel selected
    #[error("Invalid channel selection: {reason}")]
    InvalidChannels {
        /// Why the selection was rejected
        reason: &'static str,
    },
}

/// Any error surfaced by a pipeline or hub query
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CorrelationError {
    /// Input rejected
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Query made too early
    #[error("Precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    /// Bad configuration
    #[error("Configuration rejected: {0}")]
    Config(#[from] ConfigError),

    /// Hub has no pipeline for this sensor
    #[error("No stream registered for sensor {sensor_id}")]
    UnknownStream {
        /// Sensor that was queried
        sensor_id: i64,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for ValidationError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::LocationArity { found } =>
                defmt::write!(fmt, "Location has {} entries, expected 2", found),
            Self::NegativeTime { time } =>
                defmt::write!(fmt, "Negative time {}", time),
            Self::NonFiniteTime =>
                defmt::write!(fmt, "Non-finite time"),
            Self::NonFiniteLocation { axis } =>
                defmt::write!(fmt, "Non-finite location axis {}", axis),
            Self::NonFiniteLeadTime =>
                defmt::write!(fmt, "Non-finite lead time"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PreconditionError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InsufficientHistory { required, available } =>
                defmt::write!(fmt, "Need {} observations, have {}", required, available),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages_carry_context() {
        let err = ValidationError::LocationArity { found: 3 };
        assert_eq!(err.to_string(), "Input is malformed: location has 3 entries, expected 2");

        let err = PreconditionError::InsufficientHistory { required: 2, available: 1 };
        assert!(err.to_string().contains("have 1"));
    }

    #[test]
    fn umbrella_conversion() {
        let err: CorrelationError = PreconditionError::InsufficientHistory {
            required: 2,
            available: 0,
        }
        .into();
        assert!(matches!(err, CorrelationError::Precondition(_)));

        let err: CorrelationError = ValidationError::NonFiniteLeadTime.into();
        assert_eq!(err, CorrelationError::Validation(ValidationError::NonFiniteLeadTime));
    }
}
