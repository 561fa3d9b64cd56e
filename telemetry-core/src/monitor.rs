//! Dashboard state built from the feed's classified readings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use crate::alerting::{Alert, AlertBoard, AlertKind, AlertingConfig};
use crate::budget::{Budget, BudgetTracker};
use crate::classification::{Connectivity, ScoreGrade, Severity};
use crate::config::{FeedConfig, MetricKind};
use crate::score::{ScoreTracker, Trend};
use crate::telemetry::{ClassifiedReading, MetricReading, RollingWindow};

/// One budget row of the snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    #[serde(flatten)]
    pub budget: Budget,
    pub utilization_percent: f64,
    pub remaining: f64,
    pub status: Severity,
}

/// Sustainability score as shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub score: f64,
    pub grade: ScoreGrade,
    pub trend: Trend,
    pub change: String,
}

/// Serializable view of the dashboard at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub sensors_online: usize,
    pub sensors_total: usize,
    /// Latest reading per metric, keyed by name
    pub readings: BTreeMap<String, ClassifiedReading>,
    /// Chart history per metric, oldest first
    pub series: BTreeMap<String, Vec<MetricReading>>,
    pub budgets: Vec<BudgetSummary>,
    pub average_utilization: Option<f64>,
    pub alerts: Vec<Alert>,
    pub pending_alerts: usize,
    pub score: Option<ScoreSummary>,
}

/// Aggregates readings into charts, budgets, alerts and the score
#[derive(Debug)]
pub struct DashboardMonitor {
    kinds: HashMap<String, MetricKind>,
    window_capacity: usize,
    windows: HashMap<String, RollingWindow<MetricReading>>,
    latest: HashMap<String, ClassifiedReading>,
    budgets: BudgetTracker,
    alerts: AlertBoard,
    score: Option<ScoreTracker>,
}

impl DashboardMonitor {
    pub fn new(config: &FeedConfig, budgets: BudgetTracker, alerting: AlertingConfig) -> Self {
        let kinds = config
            .metrics
            .iter()
            .map(|m| (m.name.clone(), m.kind))
            .collect();

        let score = config
            .metrics
            .iter()
            .find(|m| m.kind == MetricKind::Score)
            .map(|m| ScoreTracker::new(m.initial));

        Self {
            kinds,
            window_capacity: config.window_capacity,
            windows: Self::history_windows(config),
            latest: HashMap::new(),
            budgets,
            alerts: AlertBoard::new(alerting),
            score,
        }
    }

    /// Chart windows prefilled with configured history, one interval apart
    /// and ending one interval before now
    fn history_windows(config: &FeedConfig) -> HashMap<String, RollingWindow<MetricReading>> {
        let now = Utc::now();
        config
            .metrics
            .iter()
            .filter(|m| !m.history.is_empty())
            .map(|m| {
                let step = chrono::Duration::from_std(m.interval).unwrap_or_else(|_| chrono::Duration::zero());
                let mut window = RollingWindow::new(config.window_capacity);
                let count = m.history.len() as i32;
                for (i, value) in m.history.iter().enumerate() {
                    window.push(MetricReading {
                        name: m.name.clone(),
                        value: *value,
                        unit: m.unit.clone(),
                        timestamp: now - step * (count - i as i32),
                    });
                }
                (m.name.clone(), window)
            })
            .collect()
    }

    /// Record starting values without raising alerts
    pub fn seed(&mut self, readings: impl IntoIterator<Item = ClassifiedReading>) {
        for classified in readings {
            self.push_window(&classified);
            self.latest.insert(classified.reading.name.clone(), classified);
        }
    }

    /// Apply one reading and return the alerts it raised
    pub fn ingest(&mut self, classified: &ClassifiedReading) -> Vec<Alert> {
        let name = classified.reading.name.as_str();
        let mut raised = Vec::new();

        let Some(kind) = self.kinds.get(name).copied() else {
            warn!("Ignoring reading for unconfigured metric {}", name);
            return raised;
        };

        self.push_window(classified);

        if let Some(budget_id) = &classified.budget_id {
            raised.extend(self.record_budget(budget_id, classified.reading.value));
        }

        match kind {
            MetricKind::Sensor => {
                let previous = self.latest.get(name).map(|r| r.status.severity());
                raised.extend(self.check_sensor(classified, previous));
            }
            MetricKind::Score => {
                if let Some(score) = self.score.as_mut() {
                    let trend = score.update(classified.reading.value);
                    debug!("Sustainability score {:.1} ({:?})", score.current(), trend);
                }
            }
            MetricKind::FacilityRate | MetricKind::HeatmapZone | MetricKind::SiteEmissions => {}
        }

        self.latest.insert(name.to_string(), classified.clone());
        raised
    }

    fn push_window(&mut self, classified: &ClassifiedReading) {
        let capacity = self.window_capacity;
        self.windows
            .entry(classified.reading.name.clone())
            .or_insert_with(|| RollingWindow::new(capacity))
            .push(classified.reading.clone());
    }

    fn record_budget(&mut self, budget_id: &str, value: f64) -> Option<Alert> {
        let update = match self.budgets.record(budget_id, value) {
            Ok(update) => update,
            Err(e) => {
                warn!("Cannot record emissions: {}", e);
                return None;
            }
        };

        let budget = self.budgets.get(budget_id)?;
        if !update.escalated() || !budget.alerts_enabled {
            return None;
        }

        let title = match update.current {
            Severity::Critical => "Budget Exceeded",
            Severity::Warning => "Threshold Approaching",
            Severity::Normal => return None,
        };
        let description = format!(
            "{} at {:.1}% of its {:.1} {} limit",
            budget.name, update.utilization_percent, budget.limit, budget.unit
        );
        let facility = budget.facility.clone();

        self.alerts.raise(
            update.current.into(),
            title,
            description,
            facility,
            Some(budget_id.to_string()),
        )
    }

    fn check_sensor(&mut self, classified: &ClassifiedReading, previous: Option<Severity>) -> Option<Alert> {
        if !self.alerts.config().sensor_alerts {
            return None;
        }

        let current = classified.status.severity();
        let previous = previous.unwrap_or(Severity::Normal);
        if current <= previous {
            return None;
        }

        let reading = &classified.reading;
        let kind = AlertKind::from(current);
        let title = match kind {
            AlertKind::Critical => "Sensor Critical",
            _ => "Sensor Warning",
        };

        self.alerts.raise(
            kind,
            title,
            format!("{} reading {:.1} {}", reading.name, reading.value, reading.unit),
            classified.facility.clone().unwrap_or_default(),
            Some(reading.name.clone()),
        )
    }

    /// Sensors currently online, and the number of sensors
    pub fn online_sensors(&self) -> (usize, usize) {
        let sensors: Vec<_> = self
            .latest
            .values()
            .filter(|r| self.kinds.get(&r.reading.name) == Some(&MetricKind::Sensor))
            .collect();
        let online = sensors
            .iter()
            .filter(|r| r.online && r.connectivity == Connectivity::Online)
            .count();
        (online, sensors.len())
    }

    pub fn latest(&self, metric: &str) -> Option<&ClassifiedReading> {
        self.latest.get(metric)
    }

    pub fn window(&self, metric: &str) -> Option<&RollingWindow<MetricReading>> {
        self.windows.get(metric)
    }

    pub fn budgets(&self) -> &BudgetTracker {
        &self.budgets
    }

    pub fn budgets_mut(&mut self) -> &mut BudgetTracker {
        &mut self.budgets
    }

    pub fn alerts(&self) -> &AlertBoard {
        &self.alerts
    }

    pub fn alerts_mut(&mut self) -> &mut AlertBoard {
        &mut self.alerts
    }

    pub fn score(&self) -> Option<&ScoreTracker> {
        self.score.as_ref()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let (sensors_online, sensors_total) = self.online_sensors();

        let budgets = self
            .budgets
            .budgets()
            .iter()
            .map(|budget| BudgetSummary {
                utilization_percent: budget.utilization_percent(),
                remaining: budget.remaining(),
                status: self.budgets.status_of(budget),
                budget: budget.clone(),
            })
            .collect();

        let score = self.score.as_ref().map(|s| ScoreSummary {
            score: s.current(),
            grade: s.grade(),
            trend: s.trend(),
            change: s.describe_change(),
        });

        DashboardSnapshot {
            generated_at: Utc::now(),
            sensors_online,
            sensors_total,
            readings: self.latest.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            series: self.windows.iter().map(|(k, w)| (k.clone(), w.to_vec())).collect(),
            budgets,
            average_utilization: self.budgets.average_utilization(),
            alerts: self.alerts.alerts().cloned().collect(),
            pending_alerts: self.alerts.pending().count(),
            score,
        }
    }
}
