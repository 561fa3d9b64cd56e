use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classification::{Connectivity, Status};

/// A single value produced for a named metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReading {
    /// Metric identifier, e.g. `CO2-001`
    pub name: String,
    /// Reading value in `unit`
    pub value: f64,
    /// Unit label, e.g. `tCO₂/h`
    pub unit: String,
    /// When the value last advanced. Frozen metrics keep their old timestamp.
    pub timestamp: DateTime<Utc>,
}

impl MetricReading {
    /// Seconds between the reading and `now`, never negative
    pub fn age_secs(&self, now: DateTime<Utc>) -> f64 {
        let millis = (now - self.timestamp).num_milliseconds().max(0);
        millis as f64 / 1000.0
    }
}

/// A reading together with the labels derived from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedReading {
    pub reading: MetricReading,
    /// Facility the metric belongs to, if any
    pub facility: Option<String>,
    /// Budget this metric feeds, if any
    pub budget_id: Option<String>,
    /// Value status from the metric's threshold set
    pub status: Status,
    /// Device status from the reading's age
    pub connectivity: Connectivity,
    /// False while the generator is frozen
    pub online: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_age_secs() {
        let now = Utc::now();
        let reading = MetricReading {
            name: "CO2-001".to_string(),
            value: 2.4,
            unit: "tCO₂/h".to_string(),
            timestamp: now - Duration::milliseconds(2500),
        };

        assert!((reading.age_secs(now) - 2.5).abs() < f64::EPSILON);
        // Clock skew never yields a negative age
        assert_eq!(reading.age_secs(now - Duration::seconds(10)), 0.0);
    }
}
