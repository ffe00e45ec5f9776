//! Detection Event Types
//!
//! ## Overview
//!
//! Detections enter the core as `RawDetection`s: whatever the enclosing
//! runtime handed over, unchecked. Validation turns a raw detection into an
//! `EventRecord`, which is immutable and guaranteed well-formed:
//!
//! ```text
//! RawDetection ──validate──→ EventRecord ──→ HistoryBuffer / DedupSet
//!      ↓                                            ↓
//!  ValidationError                           DetectionRecord (output)
//! ```
//!
//! ## Wire Shape
//!
//! The input record has the sensor record shape
//! `{location = {double, 2}, time = double, value = int}`, where `value` is
//! the id of the detected entity. With the `serde` feature, both `value` and
//! `entity_id` are accepted as the field name.
//!
//! The normalized output record `{time, observed_ids, sensor_id}` also has a
//! plain string form (`Display`), the payload handed to log-file writers.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::ops::{Add, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::LOCATION_DIMENSIONS;
use crate::errors::{ValidationError, ValidationResult};
use crate::time::ModelTime;

/// 2-D position (x = east-west, y = north-south)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    /// Horizontal component
    pub x: f64,
    /// Vertical component
    pub y: f64,
}

impl Location {
    /// Create a location
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Build from a component slice, checking arity and finiteness
    pub fn from_slice(components: &[f64]) -> ValidationResult<Self> {
        if components.len() != LOCATION_DIMENSIONS {
            return Err(ValidationError::LocationArity {
                found: components.len(),
            });
        }

        if let Some(axis) = components.iter().position(|c| !c.is_finite()) {
            return Err(ValidationError::NonFiniteLocation { axis });
        }

        Ok(Self::new(components[0], components[1]))
    }

    /// Components as an array
    pub const fn to_array(self) -> [f64; LOCATION_DIMENSIONS] {
        [self.x, self.y]
    }

    /// Apply `f` to each axis independently
    pub fn map(self, mut f: impl FnMut(f64) -> f64) -> Self {
        Self::new(f(self.x), f(self.y))
    }
}

impl Add for Location {
    type Output = Location;

    fn add(self, rhs: Location) -> Location {
        Location::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Location {
    type Output = Location;

    fn sub(self, rhs: Location) -> Location {
        Location::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Unvalidated detection as delivered by the runtime
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawDetection {
    /// Id of the detected entity
    #[cfg_attr(feature = "serde", serde(alias = "value"))]
    pub entity_id: i64,
    /// Location components, expected to be exactly `[x, y]`
    pub location: Vec<f64>,
    /// Detection time
    pub time: ModelTime,
}

impl RawDetection {
    /// Create from parts
    pub fn new(entity_id: i64, location: &[f64], time: ModelTime) -> Self {
        Self {
            entity_id,
            location: location.to_vec(),
            time,
        }
    }

    /// Validate into an `EventRecord`
    pub fn validate(&self) -> ValidationResult<EventRecord> {
        let location = Location::from_slice(&self.location)?;
        EventRecord::new(self.entity_id, location, self.time)
    }
}

/// One validated detection
///
/// Fields are private so every instance has passed validation: two finite
/// location components and a finite, non-negative time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct EventRecord {
    entity_id: i64,
    location: Location,
    time: ModelTime,
}

impl EventRecord {
    /// Create a record, validating location and time
    pub fn new(entity_id: i64, location: Location, time: ModelTime) -> ValidationResult<Self> {
        if !location.x.is_finite() {
            return Err(ValidationError::NonFiniteLocation { axis: 0 });
        }
        if !location.y.is_finite() {
            return Err(ValidationError::NonFiniteLocation { axis: 1 });
        }
        if !time.is_finite() {
            return Err(ValidationError::NonFiniteTime);
        }
        if time < 0.0 {
            return Err(ValidationError::NegativeTime { time });
        }

        Ok(Self {
            entity_id,
            location,
            time,
        })
    }

    /// Id of the detected entity
    pub fn entity_id(&self) -> i64 {
        self.entity_id
    }

    /// Detection location
    pub fn location(&self) -> Location {
        self.location
    }

    /// Detection time
    pub fn time(&self) -> ModelTime {
        self.time
    }

    /// Scalar carried by the wire record's `value` field
    ///
    /// This is the entity id; forecasts extrapolate it like a coordinate.
    pub fn value(&self) -> i64 {
        self.entity_id
    }
}

/// Normalized output record
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectionRecord {
    /// Time of the event that produced this record
    pub time: ModelTime,
    /// Entities seen in the current reporting period, e.g. `"[1, 4]"`
    pub observed_ids: String,
    /// Configured id of the reporting sensor
    pub sensor_id: i64,
}

impl fmt::Display for DetectionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} - {}", self.sensor_id, self.time, self.observed_ids)
    }
}
