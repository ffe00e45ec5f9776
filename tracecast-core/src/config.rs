//! Pipeline configuration
//!
//! One explicit struct holds the model parameters (`timeWindow`,
//! `timeForecasting`, `amounts`, `reportPeriod`, `idSensor`) that model
//! files set by name. With the `serde` feature the struct deserializes from
//! either the snake_case field names or the camelCase attribute names, and
//! any missing field takes its default.
//!
//! ```rust
//! use tracecast_core::{CorrelationConfig, ForecastPrecision};
//!
//! let config = CorrelationConfig::default()
//!     .with_sensor_id(3)
//!     .with_time_window(4.0)
//!     .with_forecast_precision(ForecastPrecision::Full);
//!
//! assert!(config.validate().is_ok());
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_AMOUNTS, DEFAULT_REPORT_PERIOD, DEFAULT_SENSOR_ID, DEFAULT_TIME_FORECASTING,
    DEFAULT_TIME_WINDOW,
};
use crate::errors::{ConfigError, ConfigResult};
use crate::gate::WindowGate;

/// Rounding policy for forecasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ForecastPrecision {
    /// Integer time span and truncated increments
    #[default]
    Truncated,
    /// Floating-point span and increments, no truncation
    Full,
}

/// Bit flags selecting the output channels of an emission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelFlags(u8);

impl ChannelFlags {
    /// Raw detection location
    pub const LOCATION: Self = Self(1 << 0);
    /// Raw detection time
    pub const TIME: Self = Self(1 << 1);
    /// Normalized detection record
    pub const VALUE: Self = Self(1 << 2);
    /// Configured sensor id
    pub const SENSOR: Self = Self(1 << 3);

    /// No channel
    pub const fn empty() -> Self {
        Self(0)
    }

    /// All four channels
    pub const fn all() -> Self {
        Self(0b1111)
    }

    /// Add channels
    pub fn set(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Remove channels
    pub fn unset(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Check that every channel in `other` is selected
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if no channel is selected
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl Default for ChannelFlags {
    fn default() -> Self {
        Self::all()
    }
}

/// Configuration for one correlation pipeline
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CorrelationConfig {
    /// Emission window; floored to the gate threshold
    #[cfg_attr(feature = "serde", serde(alias = "timeWindow"))]
    pub time_window: f64,

    /// Lead time used by `forecast()`
    #[cfg_attr(feature = "serde", serde(alias = "timeForecasting"))]
    pub time_forecasting: f64,

    /// Reserved; carried for compatibility, not read by the pipeline
    pub amounts: u32,

    /// Interval between deduplication resets
    #[cfg_attr(feature = "serde", serde(alias = "reportPeriod"))]
    pub report_period: u32,

    /// Id stamped on every normalized record
    #[cfg_attr(feature = "serde", serde(alias = "idSensor"))]
    pub sensor_id: i64,

    /// Forecast rounding policy
    pub forecast_precision: ForecastPrecision,

    /// Channels populated on emission
    pub channels: ChannelFlags,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            time_window: DEFAULT_TIME_WINDOW,
            time_forecasting: DEFAULT_TIME_FORECASTING,
            amounts: DEFAULT_AMOUNTS,
            report_period: DEFAULT_REPORT_PERIOD,
            sensor_id: DEFAULT_SENSOR_ID,
            forecast_precision: ForecastPrecision::default(),
            channels: ChannelFlags::default(),
        }
    }
}

impl CorrelationConfig {
    /// Set the emission window
    pub fn with_time_window(mut self, time_window: f64) -> Self {
        self.time_window = time_window;
        self
    }

    /// Set the default forecast lead time
    pub fn with_time_forecasting(mut self, lead: f64) -> Self {
        self.time_forecasting = lead;
        self
    }

    /// Set the reserved amounts parameter
    pub fn with_amounts(mut self, amounts: u32) -> Self {
        self.amounts = amounts;
        self
    }

    /// Set the deduplication reset interval
    pub fn with_report_period(mut self, period: u32) -> Self {
        self.report_period = period;
        self
    }

    /// Set the sensor id
    pub fn with_sensor_id(mut self, sensor_id: i64) -> Self {
        self.sensor_id = sensor_id;
        self
    }

    /// Set the forecast rounding policy
    pub fn with_forecast_precision(mut self, precision: ForecastPrecision) -> Self {
        self.forecast_precision = precision;
        self
    }

    /// Select output channels
    pub fn with_channels(mut self, channels: ChannelFlags) -> Self {
        self.channels = channels;
        self
    }

    /// Check every parameter
    pub fn validate(&self) -> ConfigResult<()> {
        WindowGate::from_window(self.time_window)?;

        if !self.time_forecasting.is_finite() || self.time_forecasting < 0.0 {
            return Err(ConfigError::InvalidForecastLead {
                value: self.time_forecasting,
            });
        }

        if self.report_period == 0 {
            return Err(ConfigError::ZeroReportPeriod);
        }

        if self.channels.is_empty() {
            return Err(ConfigError::InvalidChannels {
                reason: "at least one output channel must be selected",
            });
        }

        if !ChannelFlags::all().contains(self.channels) {
            return Err(ConfigError::InvalidChannels {
                reason: "mask selects unknown channels",
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_model_parameters() {
        let config = CorrelationConfig::default();

        assert_eq!(config.time_window, 0.5);
        assert_eq!(config.time_forecasting, 10.0);
        assert_eq!(config.amounts, 5);
        assert_eq!(config.report_period, 2);
        assert_eq!(config.forecast_precision, ForecastPrecision::Truncated);
        assert_eq!(config.channels, ChannelFlags::all());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_parameters() {
        let config = CorrelationConfig::default().with_report_period(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroReportPeriod));

        let config = CorrelationConfig::default().with_time_window(-2.0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTimeWindow { .. })));

        let config = CorrelationConfig::default().with_time_forecasting(f64::NAN);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidForecastLead { .. })));

        let config = CorrelationConfig::default().with_channels(ChannelFlags::empty());
        assert!(matches!(config.validate(), Err(ConfigError::InvalidChannels { .. })));
    }

    #[test]
    fn unknown_channel_bits_rejected() {
        let config = CorrelationConfig::default().with_channels(ChannelFlags(1 << 4));
        assert!(matches!(config.validate(), Err(ConfigError::InvalidChannels { .. })));

        // Known bits mixed with an unknown one are still refused
        let config = CorrelationConfig::default().with_channels(ChannelFlags(0b1_0001));
        assert!(matches!(config.validate(), Err(ConfigError::InvalidChannels { .. })));
    }

    #[test]
    fn channel_flags() {
        let mut flags = ChannelFlags::empty();
        flags.set(ChannelFlags::VALUE);
        flags.set(ChannelFlags::TIME);

        assert!(flags.contains(ChannelFlags::VALUE));
        assert!(flags.contains(ChannelFlags::TIME));
        assert!(!flags.contains(ChannelFlags::SENSOR));

        flags.unset(ChannelFlags::TIME);
        assert!(!flags.contains(ChannelFlags::TIME));
    }
}
