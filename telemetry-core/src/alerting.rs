use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

use crate::classification::Severity;
use crate::error::AlertError;

/// Alert kinds shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    /// Informational notice
    Info,
    /// A limit is being approached
    Warning,
    /// A limit has been exceeded
    Critical,
}

impl From<Severity> for AlertKind {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Normal => AlertKind::Info,
            Severity::Warning => AlertKind::Warning,
            Severity::Critical => AlertKind::Critical,
        }
    }
}

/// Alert instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Unique ID for the alert
    pub id: String,
    pub kind: AlertKind,
    pub title: String,
    pub description: String,
    pub facility: String,
    /// Metric or budget that raised the alert
    pub source: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub acknowledged: bool,
}

/// Configuration for the alert board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertingConfig {
    /// Whether alerts are raised at all
    pub enabled: bool,
    /// Alerts kept before the oldest is dropped
    pub max_alerts: usize,
    /// Raise alerts when sensors move into warning or critical
    pub sensor_alerts: bool,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_alerts: 50,
            sensor_alerts: true,
        }
    }
}

/// Dashboard alert list
#[derive(Debug, Clone, Default)]
pub struct AlertBoard {
    alerts: VecDeque<Alert>,
    config: AlertingConfig,
}

impl AlertBoard {
    pub fn new(config: AlertingConfig) -> Self {
        Self {
            alerts: VecDeque::new(),
            config,
        }
    }

    pub fn config(&self) -> &AlertingConfig {
        &self.config
    }

    /// Raise a new alert. Returns `None` when alerting is disabled.
    pub fn raise(
        &mut self,
        kind: AlertKind,
        title: impl Into<String>,
        description: impl Into<String>,
        facility: impl Into<String>,
        source: Option<String>,
    ) -> Option<Alert> {
        if !self.config.enabled {
            return None;
        }

        let alert = Alert {
            id: format!("alert_{:x}", rand::random::<u64>()),
            kind,
            title: title.into(),
            description: description.into(),
            facility: facility.into(),
            source,
            timestamp: Utc::now(),
            acknowledged: false,
        };

        match alert.kind {
            AlertKind::Critical => warn!("{}: {} ({})", alert.title, alert.description, alert.facility),
            _ => info!("{}: {} ({})", alert.title, alert.description, alert.facility),
        }

        self.alerts.push_back(alert.clone());
        while self.alerts.len() > self.config.max_alerts.max(1) {
            if let Some(dropped) = self.alerts.pop_front() {
                debug!("Dropping oldest alert {}", dropped.id);
            }
        }

        Some(alert)
    }

    /// Mark an alert as seen; it stays on the board
    pub fn acknowledge(&mut self, id: &str) -> Result<(), AlertError> {
        let alert = self
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AlertError::NotFound(id.to_string()))?;
        alert.acknowledged = true;
        Ok(())
    }

    /// Remove an alert from the board
    pub fn dismiss(&mut self, id: &str) -> Result<Alert, AlertError> {
        let index = self
            .alerts
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| AlertError::NotFound(id.to_string()))?;
        self.alerts
            .remove(index)
            .ok_or_else(|| AlertError::NotFound(id.to_string()))
    }

    /// Unacknowledged alerts, oldest first
    pub fn pending(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(|a| !a.acknowledged)
    }

    pub fn alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raise_warning(board: &mut AlertBoard, facility: &str) -> Alert {
        board
            .raise(
                AlertKind::Warning,
                "Threshold Approaching",
                "emissions at 85% of daily budget",
                facility,
                None,
            )
            .unwrap()
    }

    #[test]
    fn test_acknowledge_keeps_alert() {
        let mut board = AlertBoard::default();
        let alert = raise_warning(&mut board, "Plant B");

        assert_eq!(board.pending().count(), 1);
        board.acknowledge(&alert.id).unwrap();
        assert_eq!(board.pending().count(), 0);
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_dismiss_removes_alert() {
        let mut board = AlertBoard::default();
        let first = raise_warning(&mut board, "Plant B");
        let second = raise_warning(&mut board, "Plant C");

        let removed = board.dismiss(&first.id).unwrap();
        assert_eq!(removed.facility, "Plant B");
        assert_eq!(board.alerts().map(|a| a.id.clone()).collect::<Vec<_>>(), vec![second.id]);

        assert_eq!(board.dismiss(&first.id), Err(AlertError::NotFound(first.id.clone())));
        assert!(board.acknowledge("nope").is_err());
    }

    #[test]
    fn test_board_is_capped() {
        let mut board = AlertBoard::new(AlertingConfig {
            max_alerts: 2,
            ..AlertingConfig::default()
        });
        let first = raise_warning(&mut board, "Plant A");
        raise_warning(&mut board, "Plant B");
        raise_warning(&mut board, "Plant C");

        assert_eq!(board.len(), 2);
        assert!(board.alerts().all(|a| a.id != first.id));
    }

    #[test]
    fn test_disabled_board_raises_nothing() {
        let mut board = AlertBoard::new(AlertingConfig {
            enabled: false,
            ..AlertingConfig::default()
        });
        assert!(board
            .raise(AlertKind::Critical, "Budget Exceeded", "over limit", "Plant C", None)
            .is_none());
        assert!(board.is_empty());
    }

    #[test]
    fn test_kind_from_severity() {
        assert_eq!(AlertKind::from(Severity::Critical), AlertKind::Critical);
        assert_eq!(AlertKind::from(Severity::Normal), AlertKind::Info);
    }
}
