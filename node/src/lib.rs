// Carbon Telemetry Node
// Runs the telemetry feed into the dashboard monitor

pub mod config;
pub mod dashboard;
pub mod logging;

pub use crate::config::{BudgetsConfig, ConfigOverrides, NodeConfig, NodeConfigError};
pub use crate::dashboard::DashboardRunner;
