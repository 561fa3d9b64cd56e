use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::catalog;
use crate::classification::{Connectivity, MetricClassifier, StatusFamily, ThresholdSet};
use crate::error::{TelemetryError, TelemetryResult};
use crate::telemetry::{TelemetryGenerator, DEFAULT_WINDOW_CAPACITY};

/// What a metric represents on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// An IoT device reading; counts toward the online/total summary
    Sensor,
    /// Hourly emission rate of a whole facility
    FacilityRate,
    /// One cell of the facility heat map
    HeatmapZone,
    /// The sustainability score
    Score,
    /// Accumulated site emissions tracked against a budget
    SiteEmissions,
}

/// Configuration for one generated metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    pub name: String,
    pub unit: String,
    pub kind: MetricKind,
    #[serde(default)]
    pub facility: Option<String>,
    pub family: StatusFamily,
    /// Ascending upper bounds; empty selects the family default
    #[serde(default)]
    pub thresholds: Vec<f64>,
    pub initial: f64,
    /// Chart points that precede `initial`, oldest first
    #[serde(default)]
    pub history: Vec<f64>,
    pub magnitude: f64,
    #[serde(default)]
    pub drift: f64,
    #[serde(default)]
    pub ceiling: Option<f64>,
    #[serde(with = "duration_serde")]
    pub interval: Duration,
    /// Start frozen
    #[serde(default)]
    pub offline: bool,
    /// Budget whose current value follows this metric
    #[serde(default)]
    pub budget_id: Option<String>,
}

impl MetricConfig {
    pub fn classifier(&self) -> TelemetryResult<MetricClassifier> {
        MetricClassifier::from_bounds(self.family, &self.thresholds)
    }

    pub fn generator(&self, seed: u64) -> TelemetryGenerator {
        TelemetryGenerator::new(&self.name, &self.unit, self.initial, seed)
            .with_magnitude(self.magnitude)
            .with_drift(self.drift)
            .with_ceiling(self.ceiling)
            .starting_offline(self.offline)
    }

    pub fn validate(&self) -> TelemetryResult<()> {
        if self.name.trim().is_empty() {
            return Err(TelemetryError::InvalidConfiguration("metric name must not be empty".to_string()));
        }

        if self.interval.is_zero() {
            return Err(TelemetryError::InvalidConfiguration(format!(
                "{}: interval must be greater than zero",
                self.name
            )));
        }

        if !self.initial.is_finite() || self.initial < 0.0 {
            return Err(TelemetryError::InvalidConfiguration(format!(
                "{}: initial value {} must be finite and non-negative",
                self.name, self.initial
            )));
        }

        if let Some(point) = self.history.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(TelemetryError::InvalidConfiguration(format!(
                "{}: history point {} must be finite and non-negative",
                self.name, point
            )));
        }

        if !self.magnitude.is_finite() || self.magnitude < 0.0 {
            return Err(TelemetryError::InvalidConfiguration(format!(
                "{}: magnitude {} must be finite and non-negative",
                self.name, self.magnitude
            )));
        }

        if !self.drift.is_finite() {
            return Err(TelemetryError::InvalidConfiguration(format!(
                "{}: drift must be finite",
                self.name
            )));
        }

        if let Some(ceiling) = self.ceiling {
            if !ceiling.is_finite() || ceiling <= 0.0 {
                return Err(TelemetryError::InvalidConfiguration(format!(
                    "{}: ceiling {} must be finite and positive",
                    self.name, ceiling
                )));
            }
        }

        self.classifier().map_err(|e| match e {
            TelemetryError::InvalidThresholds(msg) => {
                TelemetryError::InvalidThresholds(format!("{}: {}", self.name, msg))
            }
            other => other,
        })?;

        Ok(())
    }
}

/// Configuration for a telemetry feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Base RNG seed; metric `i` uses `seed + i`
    pub seed: u64,
    /// Points kept per chart series
    pub window_capacity: usize,
    /// Staleness bounds in seconds for online/warning/offline
    pub connectivity: Vec<f64>,
    pub metrics: Vec<MetricConfig>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            connectivity: vec![5.0, 60.0],
            metrics: catalog::default_metrics(),
        }
    }
}

impl FeedConfig {
    pub fn connectivity_thresholds(&self) -> TelemetryResult<ThresholdSet<Connectivity>> {
        ThresholdSet::from_bounds(&self.connectivity)
    }

    /// RNG seed for the metric at `index`
    pub fn metric_seed(&self, index: usize) -> u64 {
        self.seed.wrapping_add(index as u64)
    }

    pub fn metric(&self, name: &str) -> Option<&MetricConfig> {
        self.metrics.iter().find(|m| m.name == name)
    }

    pub fn validate(&self) -> TelemetryResult<()> {
        if self.metrics.is_empty() {
            return Err(TelemetryError::InvalidConfiguration("no metrics configured".to_string()));
        }

        if self.window_capacity == 0 {
            return Err(TelemetryError::InvalidConfiguration(
                "window capacity must be greater than zero".to_string(),
            ));
        }

        self.connectivity_thresholds()?;

        let mut names = HashSet::new();
        for metric in &self.metrics {
            metric.validate()?;
            if !names.insert(metric.name.as_str()) {
                return Err(TelemetryError::InvalidConfiguration(format!(
                    "duplicate metric name: {}",
                    metric.name
                )));
            }
        }

        Ok(())
    }
}

/// (De)serialize a `Duration` as whole seconds
pub mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
