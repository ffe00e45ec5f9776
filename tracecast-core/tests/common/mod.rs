//! Common test utilities for integration tests
//!
//! This module provides:
//! - Deterministic detection generators (walking entities, noisy input)
//! - Pre-built scenarios with their expected outcomes
//! - A recording reporter for asserting on post-step notifications

#![allow(dead_code)]

use tracecast_core::{
    Emission, PeriodReport, RawDetection, Reporter, ValidationError,
};

/// Deterministic detection generator
pub struct DetectionGenerator {
    seed: u32,
}

impl DetectionGenerator {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Entity moving in a straight line at constant velocity
    ///
    /// One detection every `interval` time units starting at `start_time`.
    pub fn straight_walk(
        &mut self,
        entity_id: i64,
        origin: (f64, f64),
        velocity: (f64, f64),
        start_time: f64,
        interval: f64,
        count: usize,
    ) -> Vec<RawDetection> {
        (0..count)
            .map(|i| {
                let dt = i as f64 * interval;
                RawDetection::new(
                    entity_id,
                    &[origin.0 + velocity.0 * dt, origin.1 + velocity.1 * dt],
                    start_time + dt,
                )
            })
            .collect()
    }

    /// Several entities detected in rotation by one sensor
    pub fn crowd(&mut self, entities: &[i64], interval: f64, count: usize) -> Vec<RawDetection> {
        (0..count)
            .map(|i| {
                let entity_id = entities[i % entities.len()];
                let x = self.random_float() * 100.0;
                let y = self.random_float() * 100.0;
                RawDetection::new(entity_id, &[x, y], i as f64 * interval)
            })
            .collect()
    }

    /// Mix malformed detections into a valid series
    ///
    /// Every `every`-th detection is replaced by a bad one, cycling through
    /// wrong arity, negative time and non-finite coordinates.
    pub fn with_malformed(&mut self, mut series: Vec<RawDetection>, every: usize) -> Vec<RawDetection> {
        for (n, i) in (every - 1..series.len()).step_by(every).enumerate() {
            let original = series[i].clone();
            series[i] = match n % 3 {
                0 => RawDetection::new(original.entity_id, &[original.location[0]], original.time),
                1 => RawDetection::new(original.entity_id, &original.location, -1.0),
                _ => RawDetection::new(original.entity_id, &[f64::NAN, 0.0], original.time),
            };
        }
        series
    }

    fn random_float(&mut self) -> f64 {
        // Linear congruential generator, same constants as glibc
        self.seed = self.seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        ((self.seed >> 16) & 0x7fff) as f64 / 32_768.0
    }
}

/// Reporter that keeps everything it is told
#[derive(Debug, Default, Clone)]
pub struct RecordingReporter {
    pub emissions: Vec<(i64, Emission)>,
    pub periods: Vec<(i64, PeriodReport)>,
    pub rejections: Vec<(i64, ValidationError)>,
}

impl Reporter for RecordingReporter {
    fn on_emission(&mut self, sensor_id: i64, emission: &Emission) {
        self.emissions.push((sensor_id, emission.clone()));
    }

    fn on_period(&mut self, sensor_id: i64, report: &PeriodReport) {
        self.periods.push((sensor_id, report.clone()));
    }

    fn on_rejected(&mut self, sensor_id: i64, error: &ValidationError) {
        self.rejections.push((sensor_id, *error));
    }
}

/// Assert two floats agree to within `tolerance`
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} ± {}, got {}",
        expected,
        tolerance,
        actual
    );
}
