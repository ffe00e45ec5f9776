//! Multi-stream fan-out
//!
//! Each sensor stream gets its own `CorrelationPipeline`, created on first
//! use from a template configuration with the stream's `sensor_id` filled
//! in. Pipelines share nothing, so streams can be driven independently and,
//! with the `rayon` feature, in parallel on rayon's worker pool
//! (`process_parallel`).

use alloc::collections::BTreeMap;
#[cfg(feature = "rayon")]
use alloc::vec::Vec;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::config::CorrelationConfig;
use crate::errors::{ConfigResult, CorrelationError, CorrelationResult};
use crate::events::RawDetection;
use crate::forecast::Forecast;
use crate::gate::WindowGate;
use crate::pipeline::{CorrelationPipeline, StepOutcome};
use crate::report::{NullReporter, Reporter};
use crate::time::ModelTime;

/// Set of independent per-sensor pipelines
pub struct CorrelationHub<R: Reporter + Clone = NullReporter> {
    template: CorrelationConfig,
    gate: WindowGate,
    reporter: R,
    streams: BTreeMap<i64, CorrelationPipeline<R>>,
}

impl CorrelationHub<NullReporter> {
    /// Create a hub without reporting
    pub fn new(template: CorrelationConfig) -> ConfigResult<Self> {
        Self::with_reporter(template, NullReporter)
    }
}

impl<R: Reporter + Clone> CorrelationHub<R> {
    /// Create a hub; every new stream gets a clone of `reporter`
    pub fn with_reporter(template: CorrelationConfig, reporter: R) -> ConfigResult<Self> {
        template.validate()?;
        let gate = WindowGate::from_window(template.time_window)?;

        Ok(Self {
            template,
            gate,
            reporter,
            streams: BTreeMap::new(),
        })
    }

    /// Pipeline for `sensor_id`, created if missing
    pub fn stream_mut(&mut self, sensor_id: i64) -> &mut CorrelationPipeline<R> {
        let Self {
            template,
            gate,
            reporter,
            streams,
        } = self;

        streams.entry(sensor_id).or_insert_with(|| {
            let config = template.clone().with_sensor_id(sensor_id);
            CorrelationPipeline::assemble(config, *gate, reporter.clone())
        })
    }

    /// Pipeline for `sensor_id`, if one exists
    pub fn stream(&self, sensor_id: i64) -> Option<&CorrelationPipeline<R>> {
        self.streams.get(&sensor_id)
    }

    /// Feed one detection to the stream of `sensor_id`
    pub fn route(&mut self, sensor_id: i64, raw: &RawDetection) -> StepOutcome {
        self.stream_mut(sensor_id).ingest(raw)
    }

    /// Forecast on the stream of `sensor_id`
    pub fn forecast(&self, sensor_id: i64, lead: ModelTime) -> CorrelationResult<Forecast> {
        self.stream(sensor_id)
            .ok_or(CorrelationError::UnknownStream { sensor_id })?
            .forecast_at(lead)
    }

    /// Known sensor ids, ascending
    pub fn sensor_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.streams.keys().copied()
    }

    /// Iterate over all pipelines
    pub fn streams(&self) -> impl Iterator<Item = (i64, &CorrelationPipeline<R>)> {
        self.streams.iter().map(|(id, pipeline)| (*id, pipeline))
    }

    /// Number of streams
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Check if no stream exists
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Drop the pipeline of `sensor_id`
    pub fn remove(&mut self, sensor_id: i64) -> Option<CorrelationPipeline<R>> {
        self.streams.remove(&sensor_id)
    }

    /// Template configuration for new streams
    pub fn template(&self) -> &CorrelationConfig {
        &self.template
    }
}

#[cfg(feature = "rayon")]
impl<R: Reporter + Clone + Send> CorrelationHub<R> {
    /// Process one batch per stream, streams spread over the rayon pool
    ///
    /// Events within a batch are processed in order on one worker. Batches
    /// for unknown sensors create their streams first. The number of
    /// threads is the pool size, not the number of streams.
    pub fn process_parallel(
        &mut self,
        mut batches: BTreeMap<i64, Vec<RawDetection>>,
    ) -> BTreeMap<i64, Vec<StepOutcome>> {
        for sensor_id in batches.keys() {
            self.stream_mut(*sensor_id);
        }

        let work: Vec<(i64, &mut CorrelationPipeline<R>, Vec<RawDetection>)> = self
            .streams
            .iter_mut()
            .filter_map(|(sensor_id, pipeline)| {
                let batch = batches.remove(sensor_id)?;
                Some((*sensor_id, pipeline, batch))
            })
            .collect();

        work.into_par_iter()
            .map(|(sensor_id, pipeline, batch)| {
                let outcomes: Vec<StepOutcome> =
                    batch.iter().map(|raw| pipeline.ingest(raw)).collect();
                (sensor_id, outcomes)
            })
            .collect()
    }
}
