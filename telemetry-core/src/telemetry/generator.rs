//! Synthetic telemetry generation
//!
//! Each tracked metric keeps a running value that is perturbed by a bounded
//! uniform delta plus an optional drift on every tick. Physical quantities
//! never go below zero, and a metric flagged offline keeps its value until it
//! is reconnected.

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::telemetry::reading::MetricReading;

/// Produce the next value of a metric.
///
/// Returns `max(0, previous + U(-magnitude/2, +magnitude/2) + drift)`, or
/// `previous` untouched when `frozen`. A frozen call does not consume
/// randomness.
pub fn generate_next<R: Rng>(
    previous: f64,
    magnitude: f64,
    drift: f64,
    frozen: bool,
    rng: &mut R,
) -> f64 {
    if frozen {
        return previous;
    }

    let half = magnitude.max(0.0) / 2.0;
    let delta = if half > 0.0 { rng.gen_range(-half..=half) } else { 0.0 };

    (previous + delta + drift).max(0.0)
}

/// Generator state for one metric
#[derive(Debug, Clone)]
pub struct TelemetryGenerator {
    name: String,
    unit: String,
    value: f64,
    magnitude: f64,
    drift: f64,
    /// Upper cap applied after perturbation (scores top out at 100)
    ceiling: Option<f64>,
    offline: bool,
    last_update: DateTime<Utc>,
    rng: ChaCha8Rng,
}

impl TelemetryGenerator {
    /// Create a generator starting at `initial`, with a fixed RNG seed
    pub fn new(name: impl Into<String>, unit: impl Into<String>, initial: f64, seed: u64) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            value: initial.max(0.0),
            magnitude: 0.0,
            drift: 0.0,
            ceiling: None,
            offline: false,
            last_update: Utc::now(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn with_magnitude(mut self, magnitude: f64) -> Self {
        self.magnitude = magnitude;
        self
    }

    pub fn with_drift(mut self, drift: f64) -> Self {
        self.drift = drift;
        self
    }

    pub fn with_ceiling(mut self, ceiling: Option<f64>) -> Self {
        self.ceiling = ceiling;
        if let Some(cap) = ceiling {
            self.value = self.value.min(cap);
        }
        self
    }

    /// Start frozen, as a device that is already offline
    pub fn starting_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Pin the timestamp of the starting value
    pub fn with_last_update(mut self, last_update: DateTime<Utc>) -> Self {
        self.last_update = last_update;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// Advance the metric and return the resulting reading.
    ///
    /// Offline metrics return their frozen value and the timestamp of their
    /// last real update.
    pub fn tick(&mut self, now: DateTime<Utc>) -> MetricReading {
        let next = generate_next(self.value, self.magnitude, self.drift, self.offline, &mut self.rng);

        if !self.offline {
            self.value = match self.ceiling {
                Some(cap) => next.min(cap),
                None => next,
            };
            self.last_update = now;
            debug!("{} advanced to {:.3} {}", self.name, self.value, self.unit);
        }

        self.current_reading()
    }

    /// The last produced reading, without advancing
    pub fn current_reading(&self) -> MetricReading {
        MetricReading {
            name: self.name.clone(),
            value: self.value,
            unit: self.unit.clone(),
            timestamp: self.last_update,
        }
    }

    /// Freeze the metric at its current value
    pub fn set_offline(&mut self) {
        if !self.offline {
            warn!("{} went offline at {:.3} {}", self.name, self.value, self.unit);
            self.offline = true;
        }
    }

    /// Resume generation after an external reconnect
    pub fn reconnect(&mut self) {
        if self.offline {
            info!("{} reconnected", self.name);
            self.offline = false;
        }
    }
}
