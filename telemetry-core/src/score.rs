//! Sustainability score tracking

use serde::{Deserialize, Serialize};

use crate::classification::{Classify, ScoreGrade, ThresholdSet};

/// Changes smaller than this count as no movement
pub const TREND_DEADBAND: f64 = 0.5;

/// Direction of the score between two updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

/// Keeps the current and previous sustainability score
#[derive(Debug, Clone)]
pub struct ScoreTracker {
    current: f64,
    previous: f64,
    grades: ThresholdSet<ScoreGrade>,
}

impl ScoreTracker {
    pub fn new(initial: f64) -> Self {
        let initial = initial.clamp(0.0, 100.0);
        Self {
            current: initial,
            previous: initial,
            grades: ThresholdSet::default(),
        }
    }

    /// Record a new score, clamped to 0..=100
    pub fn update(&mut self, score: f64) -> Trend {
        self.previous = self.current;
        self.current = score.clamp(0.0, 100.0);
        self.trend()
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn delta(&self) -> f64 {
        self.current - self.previous
    }

    pub fn trend(&self) -> Trend {
        let delta = self.delta();
        if delta.abs() < TREND_DEADBAND {
            Trend::Flat
        } else if delta > 0.0 {
            Trend::Up
        } else {
            Trend::Down
        }
    }

    pub fn grade(&self) -> ScoreGrade {
        self.grades.classify(self.current)
    }

    /// Short change summary, e.g. `+1.2 from last update`
    pub fn describe_change(&self) -> String {
        match self.trend() {
            Trend::Flat => "No change".to_string(),
            Trend::Up => format!("+{:.1} from last update", self.delta()),
            Trend::Down => format!("{:.1} from last update", self.delta()),
        }
    }
}
