//! Default Parameters and Fixed Sizes
//!
//! Named values shared by the configuration layer and the components.

// ===== CONFIGURATION DEFAULTS =====

/// Default emission window.
///
/// Floors to a gate threshold of 0, which is clamped to 1: every firing
/// of a ready pipeline emits.
pub const DEFAULT_TIME_WINDOW: f64 = 0.5;

/// Default lead time for on-demand forecasts, in model time units.
pub const DEFAULT_TIME_FORECASTING: f64 = 10.0;

/// Default observation amount. Reserved, not read by the current logic.
pub const DEFAULT_AMOUNTS: u32 = 5;

/// Default interval between deduplication resets, in model time units.
pub const DEFAULT_REPORT_PERIOD: u32 = 2;

/// Sensor id used when none is configured.
pub const DEFAULT_SENSOR_ID: i64 = 0;

// ===== FIXED SIZES =====

/// Observations kept per stream.
pub const HISTORY_SLOTS: usize = 2;

/// Components in a detection location (x, y).
pub const LOCATION_DIMENSIONS: usize = 2;

/// Output channels a pipeline step can populate.
pub const OUTPUT_CHANNELS: usize = 4;

/// Smallest effective gate threshold.
pub const MIN_GATE_THRESHOLD: u32 = 1;

// ===== TIME =====

/// Time reported for an empty history slot.
///
/// Slots are `Option`s here; the value is only used when rendering an
/// empty slot's time.
pub const EMPTY_SLOT_TIME: f64 = -1.0;

/// First reporting boundary of a fresh deduplication set.
pub const INITIAL_REPORT_TIME: f64 = 0.0;
