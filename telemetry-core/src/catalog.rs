//! Fixed seed catalogue for the carbon dashboard
//!
//! Starting values, perturbation sizes and tick intervals for every metric the
//! dashboard shows. Each run starts from these values.

use std::time::Duration;

use crate::budget::{Budget, BudgetPeriod};
use crate::classification::StatusFamily;
use crate::config::{MetricConfig, MetricKind};

/// Hourly emission budget line drawn on the facility chart (tCO₂/h)
pub const HOURLY_BUDGET_LINE: f64 = 4.0;

/// Metric name of the sustainability score
pub const SCORE_METRIC: &str = "sustainability-score";

/// Metric name of the site-wide emissions counter
pub const SITE_EMISSIONS_METRIC: &str = "site-emissions";

/// Daily budget of Plant A, which the site emissions counter is held against (tCO₂)
pub const DAILY_BUDGET_PLANT_A: f64 = 12.0;

const EMISSIONS_UNIT: &str = "tCO₂/h";

fn metric(name: &str, unit: &str, kind: MetricKind, family: StatusFamily, initial: f64) -> MetricConfig {
    MetricConfig {
        name: name.to_string(),
        unit: unit.to_string(),
        kind,
        facility: None,
        family,
        thresholds: Vec::new(),
        initial,
        history: Vec::new(),
        magnitude: 0.0,
        drift: 0.0,
        ceiling: None,
        interval: Duration::from_secs(2),
        offline: false,
        budget_id: None,
    }
}

fn sensor(name: &str, unit: &str, facility: &str, initial: f64, warning_at: f64, critical_at: f64) -> MetricConfig {
    MetricConfig {
        facility: Some(facility.to_string()),
        thresholds: vec![warning_at, critical_at],
        magnitude: 0.2,
        interval: Duration::from_secs(2),
        ..metric(name, unit, MetricKind::Sensor, StatusFamily::Severity, initial)
    }
}

fn facility_rate(name: &str, facility: &str, history: [f64; 5], initial: f64) -> MetricConfig {
    MetricConfig {
        facility: Some(facility.to_string()),
        history: history.to_vec(),
        thresholds: vec![HOURLY_BUDGET_LINE - 0.5, HOURLY_BUDGET_LINE],
        magnitude: 0.3,
        interval: Duration::from_secs(5),
        ..metric(name, EMISSIONS_UNIT, MetricKind::FacilityRate, StatusFamily::Severity, initial)
    }
}

fn zone(name: &str, label: &str, initial: f64) -> MetricConfig {
    MetricConfig {
        facility: Some(label.to_string()),
        magnitude: 0.2,
        interval: Duration::from_secs(4),
        ..metric(name, EMISSIONS_UNIT, MetricKind::HeatmapZone, StatusFamily::Intensity, initial)
    }
}

/// Every metric the dashboard tracks
pub fn default_metrics() -> Vec<MetricConfig> {
    let mut metrics = vec![
        sensor("CO2-001", EMISSIONS_UNIT, "Plant A", 2.4, 3.5, 4.0),
        sensor("TEMP-001", "°C", "Plant A", 68.5, 75.0, 85.0),
        sensor("PWR-001", "kW", "Plant A", 145.2, 140.0, 160.0),
        sensor("CO2-002", EMISSIONS_UNIT, "Plant B", 3.1, 3.5, 4.0),
        MetricConfig {
            offline: true,
            ..sensor("FLOW-001", "m³/h", "Plant B", 89.3, 100.0, 120.0)
        },
        sensor("CO2-003", EMISSIONS_UNIT, "Plant C", 4.8, 3.5, 4.0),
        // Readings at 00:00 through 16:00; the 20:00 reading is the starting value
        facility_rate("plant-a", "Plant A - Assembly", [2.1, 1.8, 3.2, 2.9, 3.1], 2.4),
        facility_rate("plant-b", "Plant B - Packaging", [2.8, 2.5, 3.8, 3.5, 3.2], 2.9),
        facility_rate("plant-c", "Plant C - Processing", [3.2, 2.9, 4.1, 3.8, 3.9], 3.4),
        zone("A1", "Assembly Line 1", 2.1),
        zone("A2", "Assembly Line 2", 2.8),
        zone("P1", "Packaging Unit 1", 1.9),
        zone("P2", "Packaging Unit 2", 2.3),
        zone("Q1", "Quality Control", 1.2),
        zone("S1", "Storage", 0.8),
    ];

    metrics.push(MetricConfig {
        magnitude: 2.0,
        ceiling: Some(100.0),
        interval: Duration::from_secs(8),
        ..metric(SCORE_METRIC, "pts", MetricKind::Score, StatusFamily::Grade, 78.0)
    });

    metrics.push(MetricConfig {
        facility: Some("Plant A - Assembly".to_string()),
        // 80% and 95% of the daily budget
        thresholds: vec![9.6, 11.4],
        magnitude: 0.2,
        interval: Duration::from_secs(3),
        budget_id: Some("daily-plant-a".to_string()),
        ..metric(SITE_EMISSIONS_METRIC, "tCO₂", MetricKind::SiteEmissions, StatusFamily::Severity, 8.7)
    });

    metrics
}

/// The three budgets the dashboard starts with
pub fn default_budgets() -> Vec<Budget> {
    vec![
        Budget::new("daily-plant-a", "Daily Plant A Budget", "Plant A - Assembly", BudgetPeriod::Daily, DAILY_BUDGET_PLANT_A)
            .with_current(8.7),
        Budget::new("weekly-plant-b", "Weekly Plant B Budget", "Plant B - Packaging", BudgetPeriod::Weekly, 75.0)
            .with_current(68.2),
        Budget::new("monthly-plant-c", "Monthly Plant C Budget", "Plant C - Processing", BudgetPeriod::Monthly, 300.0)
            .with_current(312.5),
    ]
}
