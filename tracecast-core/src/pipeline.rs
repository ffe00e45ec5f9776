//! Per-Stream Correlation Pipeline
//!
//! ## Overview
//!
//! A `CorrelationPipeline` owns everything one detection stream needs: the
//! two-slot history, the per-period deduplication set, the emission gate
//! and the forecast engine. Each call to `process` (or `ingest` for raw
//! input) is one synchronous step:
//!
//! ```text
//! RawDetection
//!     │ 1. validate ──────────────────────→ Rejected(ValidationError)
//!     ▼
//! EventRecord
//!     │ 2. DedupSet: roll over period, observe entity
//!     │ 3. HistoryBuffer: push, Empty → Partial → Ready
//!     │ 4. Ready? ── no ──────────────────→ Suppressed(WarmingUp)
//!     │    WindowGate.tick()? ── no ──────→ Suppressed(Gated)
//!     ▼
//! Emitted(Emission { location, time, value, sensor })
//! ```
//!
//! Forecasts are never produced by a step. They are queries over the
//! current history (`forecast`, `forecast_at`) and do not change state.
//!
//! ## State Machine
//!
//! | State     | History | Emits | Forecasts |
//! |-----------|---------|-------|-----------|
//! | `Empty`   | 0       | no    | no        |
//! | `Partial` | 1       | no    | no        |
//! | `Ready`   | 2       | gated | yes       |
//!
//! There is no terminal state; a pipeline runs for the life of its stream
//! and only `reset` returns it to `Empty`.
//!
//! ## Failure Isolation
//!
//! A rejected event touches nothing but the rejection counter. Reporter
//! callbacks run after the step's state changes are complete and only see
//! shared references, so a misbehaving reporter cannot corrupt buffered
//! state.

use heapless::Vec;

use crate::buffer::HistoryBuffer;
use crate::config::{ChannelFlags, CorrelationConfig};
use crate::constants::{HISTORY_SLOTS, OUTPUT_CHANNELS};
use crate::dedup::DedupSet;
use crate::errors::{ConfigResult, CorrelationResult, PreconditionError, ValidationError};
use crate::events::{DetectionRecord, EventRecord, Location, RawDetection};
use crate::forecast::{Forecast, ForecastEngine};
use crate::gate::WindowGate;
use crate::report::{NullReporter, Reporter};
use crate::time::ModelTime;

/// Fill level of a pipeline's history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No event stored yet
    Empty,
    /// One event stored
    Partial,
    /// Two events stored; emission and forecasting enabled
    Ready,
}

impl PipelineState {
    /// State after one more accepted event
    pub const fn advance(self) -> Self {
        match self {
            PipelineState::Empty => PipelineState::Partial,
            PipelineState::Partial | PipelineState::Ready => PipelineState::Ready,
        }
    }

    /// Human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            PipelineState::Empty => "empty",
            PipelineState::Partial => "partial",
            PipelineState::Ready => "ready",
        }
    }
}

/// One populated output channel
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelValue {
    /// Raw detection location
    Location(Location),
    /// Raw detection time
    Time(ModelTime),
    /// Normalized detection record
    Value(DetectionRecord),
    /// Configured sensor id
    Sensor(i64),
}

/// Output of an emitting step
///
/// Holds at most one value per channel, in the fixed order location, time,
/// value, sensor. Channels deselected in the configuration are absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Emission {
    channels: Vec<ChannelValue, OUTPUT_CHANNELS>,
}

impl Emission {
    fn push(&mut self, value: ChannelValue) {
        let pushed = self.channels.push(value).is_ok();
        debug_assert!(pushed, "more channels than OUTPUT_CHANNELS");
    }

    /// All populated channels
    pub fn channels(&self) -> &[ChannelValue] {
        &self.channels
    }

    /// Location channel, if selected
    pub fn location(&self) -> Option<Location> {
        self.channels.iter().find_map(|c| match c {
            ChannelValue::Location(location) => Some(*location),
            _ => None,
        })
    }

    /// Time channel, if selected
    pub fn time(&self) -> Option<ModelTime> {
        self.channels.iter().find_map(|c| match c {
            ChannelValue::Time(time) => Some(*time),
            _ => None,
        })
    }

    /// Normalized record channel, if selected
    pub fn record(&self) -> Option<&DetectionRecord> {
        self.channels.iter().find_map(|c| match c {
            ChannelValue::Value(record) => Some(record),
            _ => None,
        })
    }

    /// Sensor channel, if selected
    pub fn sensor(&self) -> Option<i64> {
        self.channels.iter().find_map(|c| match c {
            ChannelValue::Sensor(id) => Some(*id),
            _ => None,
        })
    }
}

/// Why a valid event produced no output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// Fewer than two events buffered
    WarmingUp,
    /// The window gate withheld this firing
    Gated,
}

/// Result of one pipeline step
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Event accepted and output produced
    Emitted(Emission),
    /// Event accepted, no output this time
    Suppressed(SuppressReason),
    /// Event malformed, state unchanged
    Rejected(ValidationError),
}

impl StepOutcome {
    /// Check if the step produced output
    pub fn is_emitted(&self) -> bool {
        matches!(self, StepOutcome::Emitted(_))
    }

    /// Check if the event was accepted into the pipeline
    pub fn is_accepted(&self) -> bool {
        !matches!(self, StepOutcome::Rejected(_))
    }

    /// Emission, if any
    pub fn emission(&self) -> Option<&Emission> {
        match self {
            StepOutcome::Emitted(emission) => Some(emission),
            _ => None,
        }
    }
}

/// Step counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineStats {
    /// Events accepted into the pipeline
    pub accepted: u64,
    /// Steps that emitted
    pub emitted: u64,
    /// Accepted events withheld while warming up
    pub warming_up: u64,
    /// Accepted events withheld by the gate
    pub gated: u64,
    /// Events rejected by validation
    pub rejected: u64,
    /// Reporting periods closed
    pub period_resets: u64,
}

/// Correlation pipeline for one detection stream
pub struct CorrelationPipeline<R: Reporter = NullReporter> {
    config: CorrelationConfig,
    history: HistoryBuffer,
    seen: DedupSet,
    gate: WindowGate,
    engine: ForecastEngine,
    state: PipelineState,
    stats: PipelineStats,
    reporter: R,
}

impl CorrelationPipeline<NullReporter> {
    /// Create a pipeline without reporting
    pub fn new(config: CorrelationConfig) -> ConfigResult<Self> {
        Self::with_reporter(config, NullReporter)
    }
}

impl<R: Reporter> CorrelationPipeline<R> {
    /// Create a pipeline that notifies `reporter` after each step
    pub fn with_reporter(config: CorrelationConfig, reporter: R) -> ConfigResult<Self> {
        config.validate()?;
        let gate = WindowGate::from_window(config.time_window)?;

        Ok(Self::assemble(config, gate, reporter))
    }

    /// Build from an already validated configuration
    pub(crate) fn assemble(config: CorrelationConfig, gate: WindowGate, reporter: R) -> Self {
        Self {
            history: HistoryBuffer::new(),
            seen: DedupSet::new(f64::from(config.report_period)),
            engine: ForecastEngine::new(config.forecast_precision),
            gate,
            state: PipelineState::Empty,
            stats: PipelineStats::default(),
            config,
            reporter,
        }
    }

    /// Validate and process a raw detection
    pub fn ingest(&mut self, raw: &RawDetection) -> StepOutcome {
        match raw.validate() {
            Ok(event) => self.process(event),
            Err(error) => self.reject(error),
        }
    }

    /// Validate and process a detection given as parts
    pub fn ingest_parts(
        &mut self,
        entity_id: i64,
        location: &[f64],
        time: ModelTime,
    ) -> StepOutcome {
        let event = Location::from_slice(location)
            .and_then(|location| EventRecord::new(entity_id, location, time));

        match event {
            Ok(event) => self.process(event),
            Err(error) => self.reject(error),
        }
    }

    /// Process a validated event
    pub fn process(&mut self, event: EventRecord) -> StepOutcome {
        let period = self.seen.roll_over(event.time());
        if period.is_some() {
            self.stats.period_resets += 1;
        }
        self.seen.observe(event.entity_id());

        self.history.push(event);
        self.state = self.state.advance();
        self.stats.accepted += 1;
        debug_assert_eq!(self.state == PipelineState::Ready, self.history.is_full());

        let outcome = if self.state != PipelineState::Ready {
            self.stats.warming_up += 1;
            StepOutcome::Suppressed(SuppressReason::WarmingUp)
        } else if self.gate.tick() {
            self.stats.emitted += 1;
            StepOutcome::Emitted(self.emission(&event))
        } else {
            self.stats.gated += 1;
            StepOutcome::Suppressed(SuppressReason::Gated)
        };

        // State is final for this step; only now log and tell the reporter
        let sensor_id = self.config.sensor_id;
        if let Some(report) = &period {
            log_debug!(
                "sensor {}: period {} closed with {} entities",
                sensor_id,
                report.boundary,
                report.ids.len()
            );
            self.reporter.on_period(sensor_id, report);
        }
        if let StepOutcome::Emitted(emission) = &outcome {
            self.reporter.on_emission(sensor_id, emission);
        }

        outcome
    }

    fn reject(&mut self, error: ValidationError) -> StepOutcome {
        self.stats.rejected += 1;
        log_warn!("sensor {}: rejected detection: {}", self.config.sensor_id, error);

        self.reporter.on_rejected(self.config.sensor_id, &error);
        StepOutcome::Rejected(error)
    }

    fn emission(&self, event: &EventRecord) -> Emission {
        let channels = self.config.channels;
        let mut emission = Emission::default();

        if channels.contains(ChannelFlags::LOCATION) {
            emission.push(ChannelValue::Location(event.location()));
        }
        if channels.contains(ChannelFlags::TIME) {
            emission.push(ChannelValue::Time(event.time()));
        }
        if channels.contains(ChannelFlags::VALUE) {
            emission.push(ChannelValue::Value(DetectionRecord {
                time: event.time(),
                observed_ids: self.seen.render(),
                sensor_id: self.config.sensor_id,
            }));
        }
        if channels.contains(ChannelFlags::SENSOR) {
            emission.push(ChannelValue::Sensor(self.config.sensor_id));
        }

        emission
    }

    /// Forecast at the configured lead time (`time_forecasting`)
    pub fn forecast(&self) -> Result<Forecast, PreconditionError> {
        self.forecast_lead(self.config.time_forecasting)
    }

    /// Forecast `lead` time units past the newest observation
    pub fn forecast_at(&self, lead: ModelTime) -> CorrelationResult<Forecast> {
        if !lead.is_finite() {
            return Err(ValidationError::NonFiniteLeadTime.into());
        }

        Ok(self.forecast_lead(lead)?)
    }

    fn forecast_lead(&self, lead: ModelTime) -> Result<Forecast, PreconditionError> {
        self.engine
            .forecast(&self.history, lead)
            .ok_or(PreconditionError::InsufficientHistory {
                required: HISTORY_SLOTS,
                available: self.history.len(),
            })
    }

    /// Return to `Empty`, dropping history, seen entities, gate progress
    /// and counters
    pub fn reset(&mut self) {
        self.history.clear();
        self.seen.clear();
        self.gate.reset();
        self.state = PipelineState::Empty;
        self.stats = PipelineStats::default();
    }

    /// Current state
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Buffered observations
    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Entities seen this period
    pub fn seen(&self) -> &DedupSet {
        &self.seen
    }

    /// Emission gate
    pub fn gate(&self) -> &WindowGate {
        &self.gate
    }

    /// Step counters
    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Configuration in use
    pub fn config(&self) -> &CorrelationConfig {
        &self.config
    }

    /// Configured sensor id
    pub fn sensor_id(&self) -> i64 {
        self.config.sensor_id
    }

    /// Attached reporter
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Attached reporter, mutably
    pub fn reporter_mut(&mut self) -> &mut R {
        &mut self.reporter
    }

    /// Consume the pipeline, returning its reporter
    pub fn into_reporter(self) -> R {
        self.reporter
    }
}
