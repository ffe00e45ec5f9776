//! Multi-Stream Correlation Example
//!
//! Runs several sensors through a `CorrelationHub`, one independent
//! pipeline per sensor, and prints period snapshots as they close.
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 02_multi_stream
//! ```

use std::collections::BTreeMap;

use tracecast_core::{
    CorrelationConfig, CorrelationHub, Emission, PeriodReport, RawDetection, Reporter,
    ValidationError,
};

/// Prints every notification with its sensor id
#[derive(Clone, Default)]
struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn on_emission(&mut self, _sensor_id: i64, emission: &Emission) {
        if let Some(record) = emission.record() {
            println!("  [emit]   {}", record);
        }
    }

    fn on_period(&mut self, sensor_id: i64, report: &PeriodReport) {
        println!("  [period] sensor {}: {}", sensor_id, report);
    }

    fn on_rejected(&mut self, sensor_id: i64, error: &ValidationError) {
        println!("  [reject] sensor {}: {}", sensor_id, error);
    }
}

/// Entities crossing a sensor's field of view
fn sweep(sensor: i64, count: usize) -> Vec<RawDetection> {
    (0..count)
        .map(|i| {
            let t = i as f64 * 0.75;
            let entity = (i as i64 + sensor) % 3;
            RawDetection::new(entity, &[sensor as f64 * 10.0 + t, t * 2.0], t)
        })
        .collect()
}

fn main() {
    println!("Tracecast Multi-Stream Example");
    println!("==============================\n");

    let template = CorrelationConfig::default().with_time_window(2.0);
    let mut hub = match CorrelationHub::with_reporter(template, ConsoleReporter) {
        Ok(hub) => hub,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return;
        }
    };

    println!("Sequential routing (sensor 1):");
    for raw in sweep(1, 6) {
        hub.route(1, &raw);
    }

    println!("\nParallel batches (sensors 2 and 3):");
    let mut batches = BTreeMap::new();
    batches.insert(2, sweep(2, 6));
    batches.insert(3, sweep(3, 6));
    let results = hub.process_parallel(batches);
    for (sensor, outcomes) in &results {
        let emitted = outcomes.iter().filter(|o| o.is_emitted()).count();
        println!("  sensor {}: {} steps, {} emitted", sensor, outcomes.len(), emitted);
    }

    println!("\nStreams and forecasts (lead 3.0):");
    for (sensor, pipeline) in hub.streams() {
        let stats = pipeline.stats();
        print!(
            "  sensor {}: {} accepted, {} periods closed",
            sensor, stats.accepted, stats.period_resets
        );
        match pipeline.forecast_at(3.0) {
            Ok(forecast) => println!(", entity {} → {}", forecast.value, forecast.location),
            Err(e) => println!(", {}", e),
        }
    }

    if let Err(e) = hub.forecast(42, 1.0) {
        println!("\nSensor 42: {}", e);
    }
}
