// Threshold classification
// Maps readings onto discrete status labels for display, alerting and budgets

pub mod status;
pub mod thresholds;

pub use status::{Connectivity, Intensity, ScoreGrade, Severity, Status, StatusLevel};
pub use thresholds::{classify, Classify, ThresholdSet};

use serde::{Deserialize, Serialize};

use crate::error::TelemetryResult;

/// Which status family a metric is classified into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFamily {
    Severity,
    Intensity,
    Grade,
}

/// A metric's classifier, one threshold set per family
#[derive(Debug, Clone, PartialEq)]
pub enum MetricClassifier {
    Severity(ThresholdSet<Severity>),
    Intensity(ThresholdSet<Intensity>),
    Grade(ThresholdSet<ScoreGrade>),
}

impl MetricClassifier {
    /// Build a classifier for `family` from explicit upper bounds.
    ///
    /// An empty `bounds` slice selects the family default where one exists.
    pub fn from_bounds(family: StatusFamily, bounds: &[f64]) -> TelemetryResult<Self> {
        Ok(match (family, bounds.is_empty()) {
            (StatusFamily::Intensity, true) => MetricClassifier::Intensity(ThresholdSet::default()),
            (StatusFamily::Grade, true) => MetricClassifier::Grade(ThresholdSet::default()),
            (StatusFamily::Severity, _) => MetricClassifier::Severity(ThresholdSet::from_bounds(bounds)?),
            (StatusFamily::Intensity, false) => MetricClassifier::Intensity(ThresholdSet::from_bounds(bounds)?),
            (StatusFamily::Grade, false) => MetricClassifier::Grade(ThresholdSet::from_bounds(bounds)?),
        })
    }

    pub fn family(&self) -> StatusFamily {
        match self {
            MetricClassifier::Severity(_) => StatusFamily::Severity,
            MetricClassifier::Intensity(_) => StatusFamily::Intensity,
            MetricClassifier::Grade(_) => StatusFamily::Grade,
        }
    }
}

impl Classify for MetricClassifier {
    type Status = Status;

    fn classify(&self, value: f64) -> Status {
        match self {
            MetricClassifier::Severity(set) => set.classify(value).into(),
            MetricClassifier::Intensity(set) => set.classify(value).into(),
            MetricClassifier::Grade(set) => set.classify(value).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_defaults() {
        let heatmap = MetricClassifier::from_bounds(StatusFamily::Intensity, &[]).unwrap();
        assert_eq!(heatmap.classify(2.8), Status::Intensity(Intensity::High));
        assert_eq!(heatmap.family(), StatusFamily::Intensity);

        let score = MetricClassifier::from_bounds(StatusFamily::Grade, &[]).unwrap();
        assert_eq!(score.classify(87.0), Status::Grade(ScoreGrade::A));
    }

    #[test]
    fn test_severity_requires_bounds() {
        assert!(MetricClassifier::from_bounds(StatusFamily::Severity, &[]).is_err());

        let sensor = MetricClassifier::from_bounds(StatusFamily::Severity, &[3.5, 4.0]).unwrap();
        assert_eq!(sensor.classify(3.7), Status::Severity(Severity::Warning));
    }
}
