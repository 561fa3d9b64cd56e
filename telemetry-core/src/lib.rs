// Carbon Telemetry Core
// Simulated emissions telemetry, threshold classification and dashboard state

// Public modules
pub mod alerting;
pub mod budget;
pub mod catalog;
pub mod classification;
pub mod config;
pub mod error;
pub mod feed;
pub mod monitor;
pub mod score;
pub mod telemetry;

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export commonly used types
pub use crate::alerting::{Alert, AlertBoard, AlertKind, AlertingConfig};
pub use crate::budget::{Budget, BudgetPeriod, BudgetThresholds, BudgetTracker, BudgetUpdate, NewBudget};
pub use crate::classification::{
    classify,
    Classify,
    Connectivity,
    Intensity,
    MetricClassifier,
    ScoreGrade,
    Severity,
    Status,
    StatusFamily,
    ThresholdSet,
};
pub use crate::config::{FeedConfig, MetricConfig, MetricKind};
pub use crate::error::{AlertError, BudgetError, TelemetryError, TelemetryResult};
pub use crate::feed::{FeedCommand, TelemetryFeed};
pub use crate::monitor::{DashboardMonitor, DashboardSnapshot};
pub use crate::score::{ScoreTracker, Trend};
pub use crate::telemetry::{generate_next, ClassifiedReading, MetricReading, RollingWindow, TelemetryGenerator};
