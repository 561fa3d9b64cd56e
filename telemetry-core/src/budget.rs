//! Emission budget tracking
//!
//! Budgets hold a limit and the emissions recorded against it so far.
//! Utilization is classified with the same threshold machinery as readings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::classification::{Classify, Severity, ThresholdSet};
use crate::error::{BudgetError, TelemetryResult};

/// Budget accounting period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BudgetPeriod {
    Daily,
    Weekly,
    Monthly,
}

/// An emission budget for one facility and period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub name: String,
    pub facility: String,
    pub period: BudgetPeriod,
    /// Budget limit in `unit`
    pub limit: f64,
    /// Emissions recorded so far in `unit`
    pub current: f64,
    pub unit: String,
    /// Whether threshold crossings raise alerts
    pub alerts_enabled: bool,
}

impl Budget {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        facility: impl Into<String>,
        period: BudgetPeriod,
        limit: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            facility: facility.into(),
            period,
            limit,
            current: 0.0,
            unit: "tCO₂".to_string(),
            alerts_enabled: true,
        }
    }

    pub fn with_current(mut self, current: f64) -> Self {
        self.current = current;
        self
    }

    /// Current emissions as a percentage of the limit
    pub fn utilization_percent(&self) -> f64 {
        self.current / self.limit * 100.0
    }

    /// Headroom left; negative once the budget is exceeded
    pub fn remaining(&self) -> f64 {
        self.limit - self.current
    }
}

/// Utilization percentages at which a budget turns warning and critical
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetThresholds {
    pub warning_pct: f64,
    pub critical_pct: f64,
}

impl Default for BudgetThresholds {
    fn default() -> Self {
        Self {
            warning_pct: 80.0,
            critical_pct: 95.0,
        }
    }
}

impl BudgetThresholds {
    pub fn threshold_set(&self) -> TelemetryResult<ThresholdSet<Severity>> {
        ThresholdSet::from_bounds(&[self.warning_pct, self.critical_pct])
    }
}

/// Fields supplied when creating a budget
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewBudget {
    pub name: String,
    pub facility: String,
    pub period: Option<BudgetPeriod>,
    pub limit: f64,
    pub alerts_enabled: bool,
}

/// A status change caused by recording emissions against a budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetUpdate {
    pub budget_id: String,
    pub previous: Severity,
    pub current: Severity,
    pub utilization_percent: f64,
}

impl BudgetUpdate {
    /// True when the status got worse
    pub fn escalated(&self) -> bool {
        self.current > self.previous
    }
}

/// The set of budgets shown on the dashboard
#[derive(Debug, Clone)]
pub struct BudgetTracker {
    budgets: Vec<Budget>,
    thresholds: ThresholdSet<Severity>,
}

impl Default for BudgetTracker {
    fn default() -> Self {
        let defaults = BudgetThresholds::default();
        Self::new(ThresholdSet::severity(defaults.warning_pct, defaults.critical_pct))
    }
}

impl BudgetTracker {
    pub fn new(thresholds: ThresholdSet<Severity>) -> Self {
        Self {
            budgets: Vec::new(),
            thresholds,
        }
    }

    pub fn with_budgets(mut self, budgets: impl IntoIterator<Item = Budget>) -> Result<Self, BudgetError> {
        for budget in budgets {
            self.insert(budget)?;
        }
        Ok(self)
    }

    /// Create a budget from form input. New budgets start with nothing recorded.
    pub fn add_budget(&mut self, input: NewBudget) -> Result<&Budget, BudgetError> {
        if input.name.trim().is_empty() {
            return Err(BudgetError::MissingField("name"));
        }
        if input.facility.trim().is_empty() {
            return Err(BudgetError::MissingField("facility"));
        }
        let period = input.period.ok_or(BudgetError::MissingField("period"))?;

        let mut budget = Budget::new(uuid::Uuid::new_v4().to_string(), input.name, input.facility, period, input.limit);
        budget.alerts_enabled = input.alerts_enabled;

        self.insert(budget)?;
        Ok(&self.budgets[self.budgets.len() - 1])
    }

    /// Add a fully formed budget
    pub fn insert(&mut self, budget: Budget) -> Result<(), BudgetError> {
        if !budget.limit.is_finite() || budget.limit <= 0.0 {
            return Err(BudgetError::InvalidLimit(budget.limit));
        }
        if self.get(&budget.id).is_some() {
            return Err(BudgetError::Duplicate(budget.id));
        }

        info!("Tracking budget {} ({:.1} {})", budget.name, budget.limit, budget.unit);
        self.budgets.push(budget);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Budget> {
        self.budgets.iter().find(|b| b.id == id)
    }

    pub fn budgets(&self) -> &[Budget] {
        &self.budgets
    }

    pub fn status_of(&self, budget: &Budget) -> Severity {
        self.thresholds.classify(budget.utilization_percent())
    }

    pub fn status(&self, id: &str) -> Result<Severity, BudgetError> {
        self.get(id)
            .map(|b| self.status_of(b))
            .ok_or_else(|| BudgetError::NotFound(id.to_string()))
    }

    /// Flip alerting for a budget, returning the new setting
    pub fn toggle_alerts(&mut self, id: &str) -> Result<bool, BudgetError> {
        let budget = self
            .budgets
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| BudgetError::NotFound(id.to_string()))?;

        budget.alerts_enabled = !budget.alerts_enabled;
        Ok(budget.alerts_enabled)
    }

    /// Set the emissions recorded against a budget
    pub fn record(&mut self, id: &str, current: f64) -> Result<BudgetUpdate, BudgetError> {
        let thresholds = &self.thresholds;
        let budget = self
            .budgets
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| BudgetError::NotFound(id.to_string()))?;

        let previous = thresholds.classify(budget.utilization_percent());
        budget.current = current.max(0.0);
        let utilization_percent = budget.utilization_percent();
        let status = thresholds.classify(utilization_percent);

        if status != previous {
            warn!(
                "Budget {} moved from {} to {} at {:.1}% utilization",
                budget.name, previous, status, utilization_percent
            );
        }

        Ok(BudgetUpdate {
            budget_id: budget.id.clone(),
            previous,
            current: status,
            utilization_percent,
        })
    }

    /// Mean utilization across all budgets, if there are any
    pub fn average_utilization(&self) -> Option<f64> {
        if self.budgets.is_empty() {
            return None;
        }
        let total: f64 = self.budgets.iter().map(Budget::utilization_percent).sum();
        Some(total / self.budgets.len() as f64)
    }

    /// Number of budgets per status
    pub fn status_counts(&self) -> HashMap<Severity, usize> {
        let mut counts = HashMap::new();
        for budget in &self.budgets {
            *counts.entry(self.status_of(budget)).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_budgets;

    fn tracker() -> BudgetTracker {
        BudgetTracker::default().with_budgets(default_budgets()).unwrap()
    }

    #[test]
    fn test_default_budget_statuses() {
        let tracker = tracker();
        assert_eq!(tracker.status("daily-plant-a").unwrap(), Severity::Normal);
        assert_eq!(tracker.status("weekly-plant-b").unwrap(), Severity::Warning);
        assert_eq!(tracker.status("monthly-plant-c").unwrap(), Severity::Critical);
    }

    #[test]
    fn test_utilization_and_remaining() {
        let tracker = tracker();
        let plant_c = tracker.get("monthly-plant-c").unwrap();
        assert!((plant_c.utilization_percent() - 104.1666).abs() < 0.001);
        assert!((plant_c.remaining() + 12.5).abs() < 1e-9);

        let average = tracker.average_utilization().unwrap();
        let expected = (8.7 / 12.0 + 68.2 / 75.0 + 312.5 / 300.0) * 100.0 / 3.0;
        assert!((average - expected).abs() < 1e-9);
    }

    #[test]
    fn test_add_budget_validation() {
        let mut tracker = BudgetTracker::default();

        let missing_name = NewBudget {
            facility: "Plant A - Assembly".to_string(),
            period: Some(BudgetPeriod::Daily),
            limit: 10.0,
            ..Default::default()
        };
        assert_eq!(tracker.add_budget(missing_name), Err(BudgetError::MissingField("name")));

        let bad_limit = NewBudget {
            name: "Daily".to_string(),
            facility: "Plant A - Assembly".to_string(),
            period: Some(BudgetPeriod::Daily),
            limit: 0.0,
            alerts_enabled: true,
        };
        assert_eq!(tracker.add_budget(bad_limit), Err(BudgetError::InvalidLimit(0.0)));

        let ok = NewBudget {
            name: "Daily Plant B".to_string(),
            facility: "Plant B - Packaging".to_string(),
            period: Some(BudgetPeriod::Daily),
            limit: 10.0,
            alerts_enabled: false,
        };
        let budget = tracker.add_budget(ok).unwrap();
        assert_eq!(budget.current, 0.0);
        assert!(!budget.alerts_enabled);
        assert_eq!(tracker.budgets().len(), 1);
    }

    #[test]
    fn test_record_reports_transition() {
        let mut tracker = tracker();

        let update = tracker.record("daily-plant-a", 10.0).unwrap();
        assert_eq!(update.previous, Severity::Normal);
        assert_eq!(update.current, Severity::Warning);
        assert!(update.escalated());

        let update = tracker.record("daily-plant-a", 5.0).unwrap();
        assert!(!update.escalated());
        assert_eq!(update.current, Severity::Normal);

        assert!(matches!(tracker.record("missing", 1.0), Err(BudgetError::NotFound(_))));
    }

    #[test]
    fn test_threshold_order_is_checked() {
        let inverted = BudgetThresholds {
            warning_pct: 95.0,
            critical_pct: 80.0,
        };
        assert!(inverted.threshold_set().is_err());
        assert!(BudgetThresholds::default().threshold_set().is_ok());
    }

    #[test]
    fn test_toggle_alerts() {
        let mut tracker = tracker();
        assert!(!tracker.toggle_alerts("weekly-plant-b").unwrap());
        assert!(tracker.toggle_alerts("weekly-plant-b").unwrap());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut tracker = tracker();
        let copy = tracker.get("daily-plant-a").cloned().unwrap();
        assert_eq!(tracker.insert(copy), Err(BudgetError::Duplicate("daily-plant-a".to_string())));
    }
}
