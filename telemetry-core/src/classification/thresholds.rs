//! Ordered threshold sets and the classification they drive
//!
//! A threshold set is a sequence of `(upper_bound, label)` pairs with strictly
//! ascending bounds. A value takes the label of the first bound strictly
//! greater than it; values at or above every bound take the last label.

use crate::classification::status::{Connectivity, Intensity, ScoreGrade, Severity, StatusLevel};
use crate::error::{TelemetryError, TelemetryResult};

/// Anything that maps a numeric value onto a status label
pub trait Classify {
    type Status;

    fn classify(&self, value: f64) -> Self::Status;
}

/// Classify `value` against ascending `(bound, label)` pairs.
///
/// Returns the label of the first bound that exceeds `value`, or the last
/// label when none does (this includes NaN). An empty slice is a caller bug.
pub fn classify<L: Clone>(value: f64, thresholds: &[(f64, L)]) -> L {
    assert!(!thresholds.is_empty(), "threshold set must not be empty");
    debug_assert!(is_strictly_ascending(thresholds), "threshold bounds must be strictly ascending");

    let index = thresholds
        .iter()
        .position(|(bound, _)| *bound > value)
        .unwrap_or(thresholds.len() - 1);
    thresholds[index].1.clone()
}

fn is_strictly_ascending<L>(thresholds: &[(f64, L)]) -> bool {
    thresholds.windows(2).all(|pair| pair[0].0 < pair[1].0)
}

fn check_bounds<L>(thresholds: &[(f64, L)]) -> TelemetryResult<()> {
    if thresholds.is_empty() {
        return Err(TelemetryError::InvalidThresholds("threshold set is empty".to_string()));
    }

    if let Some((bound, _)) = thresholds.iter().find(|(bound, _)| bound.is_nan()) {
        return Err(TelemetryError::InvalidThresholds(format!("bound {} is not a number", bound)));
    }

    if let Some(pair) = thresholds.windows(2).find(|pair| pair[0].0 >= pair[1].0) {
        return Err(TelemetryError::InvalidThresholds(format!(
            "bounds must be strictly ascending, found {} followed by {}",
            pair[0].0, pair[1].0
        )));
    }

    Ok(())
}

/// An ordered threshold set
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdSet<L> {
    thresholds: Vec<(f64, L)>,
}

impl<L: Clone> ThresholdSet<L> {
    /// Build a threshold set from pairs written in code.
    ///
    /// # Panics
    /// If the set is empty or the bounds are not strictly ascending.
    pub fn new(thresholds: Vec<(f64, L)>) -> Self {
        if let Err(e) = check_bounds(&thresholds) {
            panic!("{}", e);
        }
        Self { thresholds }
    }

    /// Build a threshold set from external input, reporting bad ordering
    pub fn try_new(thresholds: Vec<(f64, L)>) -> TelemetryResult<Self> {
        check_bounds(&thresholds)?;
        Ok(Self { thresholds })
    }

    /// The `(bound, label)` pairs in evaluation order
    pub fn thresholds(&self) -> &[(f64, L)] {
        &self.thresholds
    }

    /// Label returned for the largest values
    pub fn worst(&self) -> &L {
        // Non-empty by construction
        &self.thresholds[self.thresholds.len() - 1].1
    }
}

impl<L: StatusLevel> ThresholdSet<L> {
    /// Pair explicit upper bounds with the family ladder.
    ///
    /// `bounds` holds one entry fewer than the ladder; the last label gets an
    /// implicit `+inf` bound.
    pub fn from_bounds(bounds: &[f64]) -> TelemetryResult<Self> {
        if bounds.len() + 1 != L::LADDER.len() {
            return Err(TelemetryError::InvalidThresholds(format!(
                "expected {} bounds for {:?}, got {}",
                L::LADDER.len() - 1,
                L::LADDER,
                bounds.len()
            )));
        }

        if let Some(bound) = bounds.iter().find(|b| !b.is_finite()) {
            return Err(TelemetryError::InvalidThresholds(format!("bound {} is not finite", bound)));
        }

        let thresholds = bounds
            .iter()
            .copied()
            .chain(std::iter::once(f64::INFINITY))
            .zip(L::LADDER.iter().copied())
            .collect();

        Self::try_new(thresholds)
    }

    /// The explicit bounds, without the implicit `+inf`
    pub fn bounds(&self) -> Vec<f64> {
        self.thresholds
            .iter()
            .map(|(bound, _)| *bound)
            .filter(|bound| bound.is_finite())
            .collect()
    }
}

impl<L: Clone> Classify for ThresholdSet<L> {
    type Status = L;

    fn classify(&self, value: f64) -> L {
        classify(value, &self.thresholds)
    }
}

impl ThresholdSet<Severity> {
    /// Normal below `warning_at`, warning below `critical_at`, critical beyond
    pub fn severity(warning_at: f64, critical_at: f64) -> Self {
        Self::new(vec![
            (warning_at, Severity::Normal),
            (critical_at, Severity::Warning),
            (f64::INFINITY, Severity::Critical),
        ])
    }
}

impl Default for ThresholdSet<Intensity> {
    fn default() -> Self {
        Self::new(vec![
            (1.5, Intensity::Low),
            (2.5, Intensity::Medium),
            (f64::INFINITY, Intensity::High),
        ])
    }
}

impl Default for ThresholdSet<ScoreGrade> {
    fn default() -> Self {
        Self::new(vec![
            (60.0, ScoreGrade::D),
            (70.0, ScoreGrade::C),
            (80.0, ScoreGrade::B),
            (90.0, ScoreGrade::A),
            (f64::INFINITY, ScoreGrade::APlus),
        ])
    }
}

/// Staleness in seconds: online under 5s, warning under a minute, then offline
impl Default for ThresholdSet<Connectivity> {
    fn default() -> Self {
        Self::new(vec![
            (5.0, Connectivity::Online),
            (60.0, Connectivity::Warning),
            (f64::INFINITY, Connectivity::Offline),
        ])
    }
}
