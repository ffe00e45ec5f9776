//! Basic Detection Correlation Example
//!
//! Feeds one sensor's detections through a `CorrelationPipeline` and asks
//! where the last detected entity will be some time later.
//!
//! ## What You'll Learn
//!
//! - Configuring a pipeline
//! - Reading step outcomes (emitted, warming up, gated, rejected)
//! - Querying forecasts from the two-slot history
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_basic_correlation
//! ```

use tracecast_core::{
    CorrelationConfig, CorrelationPipeline, ForecastPrecision, RawDetection, StepOutcome,
};

fn main() {
    println!("Tracecast Basic Correlation Example");
    println!("===================================\n");

    let config = CorrelationConfig::default()
        .with_sensor_id(7)
        .with_time_window(2.0)
        .with_time_forecasting(4.0);

    let mut pipeline = match CorrelationPipeline::new(config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return;
        }
    };

    let detections = [
        RawDetection::new(1, &[0.0, 0.0], 0.0),
        RawDetection::new(2, &[2.0, 1.0], 1.0),
        RawDetection::new(1, &[4.0, 2.0], 2.0),
        RawDetection::new(3, &[5.0], 2.5),
        RawDetection::new(2, &[6.0, 3.0], 3.0),
        RawDetection::new(1, &[8.0, 4.0], 4.0),
    ];

    println!("Processing {} detections:", detections.len());
    for raw in &detections {
        match pipeline.ingest(raw) {
            StepOutcome::Emitted(emission) => match emission.record() {
                Some(record) => println!("  t={:<4} emitted   {}", raw.time, record),
                None => println!("  t={:<4} emitted", raw.time),
            },
            StepOutcome::Suppressed(reason) => {
                println!("  t={:<4} withheld  ({:?})", raw.time, reason)
            }
            StepOutcome::Rejected(error) => println!("  t={:<4} rejected  {}", raw.time, error),
        }
    }

    println!("\nPipeline state: {}", pipeline.state().name());
    let stats = pipeline.stats();
    println!(
        "Accepted {}, emitted {}, gated {}, rejected {}",
        stats.accepted, stats.emitted, stats.gated, stats.rejected
    );

    println!("\nForecasts:");
    match pipeline.forecast() {
        Ok(forecast) => println!(
            "  configured lead: entity {} at {} (t={})",
            forecast.value, forecast.location, forecast.time
        ),
        Err(e) => println!("  configured lead: {}", e),
    }

    for lead in [0.5, 1.0, 2.5] {
        match pipeline.forecast_at(lead) {
            Ok(forecast) => println!("  lead {:<4} → {}", lead, forecast.location),
            Err(e) => println!("  lead {:<4} → {}", lead, e),
        }
    }

    // Same history, floating-point arithmetic
    let full = CorrelationConfig::default().with_forecast_precision(ForecastPrecision::Full);
    if let Ok(mut precise) = CorrelationPipeline::new(full) {
        for raw in &detections {
            precise.ingest(raw);
        }
        if let Ok(forecast) = precise.forecast_at(2.5) {
            println!("  lead 2.5  → {} (full precision)", forecast.location);
        }
    }
}
