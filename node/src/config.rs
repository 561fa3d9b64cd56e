use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use telemetry_core::catalog::default_budgets;
use telemetry_core::{
    AlertingConfig, Budget, BudgetError, BudgetThresholds, BudgetTracker, FeedConfig, TelemetryError,
};
use thiserror::Error;
use tracing::{info, warn};

/// File read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "telemetry.toml";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Error)]
pub enum NodeConfigError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid telemetry configuration: {0}")]
    Telemetry(#[from] TelemetryError),

    #[error("Invalid budget: {0}")]
    Budget(#[from] BudgetError),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NodeConfig {
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Stop after this many seconds; 0 runs until interrupted
    pub run_for_secs: u64,
    pub feed: FeedConfig,
    pub budgets: BudgetsConfig,
    pub alerts: AlertingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BudgetsConfig {
    pub warning_pct: f64,
    pub critical_pct: f64,
    pub entries: Vec<Budget>,
}

impl Default for BudgetsConfig {
    fn default() -> Self {
        let thresholds = BudgetThresholds::default();
        Self {
            warning_pct: thresholds.warning_pct,
            critical_pct: thresholds.critical_pct,
            entries: default_budgets(),
        }
    }
}

impl BudgetsConfig {
    pub fn thresholds(&self) -> BudgetThresholds {
        BudgetThresholds {
            warning_pct: self.warning_pct,
            critical_pct: self.critical_pct,
        }
    }

    /// Build the tracker the dashboard starts with
    pub fn tracker(&self) -> Result<BudgetTracker, NodeConfigError> {
        let thresholds = self.thresholds().threshold_set()?;
        Ok(BudgetTracker::new(thresholds).with_budgets(self.entries.iter().cloned())?)
    }

    pub fn validate(&self) -> Result<(), NodeConfigError> {
        if !(0.0..=1000.0).contains(&self.warning_pct) || !(0.0..=1000.0).contains(&self.critical_pct) {
            return Err(NodeConfigError::InvalidValue(
                "budgets.warning_pct and budgets.critical_pct must be between 0 and 1000".to_string(),
            ));
        }
        self.tracker().map(|_| ())
    }
}

/// Command-line values that win over every configuration layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub seed: Option<u64>,
    pub run_for_secs: Option<u64>,
    pub log_level: Option<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            run_for_secs: 0,
            feed: FeedConfig::default(),
            budgets: BudgetsConfig::default(),
            alerts: AlertingConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Layer defaults, the configuration file and `TELEMETRY_*` environment variables.
    ///
    /// An explicit `path` must exist; otherwise `telemetry.toml` is read if present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::builder();
        config = config.add_source(Config::try_from(&Self::default())?);

        match path {
            Some(path) => {
                info!("Loading configuration from: {:?}", path);
                config = config.add_source(File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    info!("Loading configuration from: {:?}", default_path);
                    config = config.add_source(File::from(default_path));
                } else {
                    warn!("No configuration file found, using defaults");
                }
            }
        }

        config = config.add_source(
            Environment::with_prefix("TELEMETRY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: NodeConfig = config.build()?.try_deserialize()?;
        if let Err(e) = config.validate() {
            return Err(ConfigError::Message(format!("Configuration validation error: {e}")));
        }

        info!(
            "Configuration loaded: {} metrics, {} budgets, seed {}",
            config.feed.metrics.len(),
            config.budgets.entries.len(),
            config.feed.seed
        );

        Ok(config)
    }

    /// Apply command-line overrides. Call `validate()` afterwards.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(seed) = overrides.seed {
            self.feed.seed = seed;
        }
        if let Some(secs) = overrides.run_for_secs {
            self.run_for_secs = secs;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
    }

    pub fn validate(&self) -> Result<(), NodeConfigError> {
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(NodeConfigError::InvalidValue(format!(
                "log_level must be one of {:?}, got {:?}",
                LOG_LEVELS, self.log_level
            )));
        }

        if self.alerts.max_alerts == 0 {
            return Err(NodeConfigError::InvalidValue("alerts.max_alerts must be > 0".to_string()));
        }

        self.feed.validate()?;
        self.budgets.validate()?;

        // Cross-field validation
        for metric in &self.feed.metrics {
            if let Some(budget_id) = &metric.budget_id {
                if !self.budgets.entries.iter().any(|b| &b.id == budget_id) {
                    return Err(NodeConfigError::InvalidValue(format!(
                        "metric {} feeds unknown budget {}",
                        metric.name, budget_id
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn run_for(&self) -> Option<std::time::Duration> {
        (self.run_for_secs > 0).then(|| std::time::Duration::from_secs(self.run_for_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = NodeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.run_for(), None);
        assert_eq!(config.budgets.entries.len(), 3);
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let config = NodeConfig {
            log_level: "loud".to_string(),
            ..NodeConfig::default()
        };
        assert!(matches!(config.validate(), Err(NodeConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_rejects_dangling_budget_reference() {
        let mut config = NodeConfig::default();
        config.budgets.entries.retain(|b| b.id != "daily-plant-a");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("daily-plant-a"));
    }

    #[test]
    fn test_rejects_inverted_budget_thresholds() {
        let mut config = NodeConfig::default();
        config.budgets.warning_pct = 99.0;
        config.budgets.critical_pct = 90.0;
        assert!(matches!(config.validate(), Err(NodeConfigError::Telemetry(TelemetryError::InvalidThresholds(_)))));
    }

    #[test]
    fn test_rejects_non_positive_budget_limit() {
        let mut config = NodeConfig::default();
        config.budgets.entries[1].limit = 0.0;
        assert!(matches!(config.validate(), Err(NodeConfigError::Budget(BudgetError::InvalidLimit(_)))));
    }
}
