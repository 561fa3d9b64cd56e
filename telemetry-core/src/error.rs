//! Error types for the telemetry core
//!
//! The generator and classifier never fail at runtime. Errors only come from
//! the edges: configuration coming from files, feed lifecycle misuse, budget
//! bookkeeping and alert handling.

use thiserror::Error;

/// Main error type for the telemetry core
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Threshold bounds that are not strictly ascending or not finite
    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),

    /// A command referenced a metric the feed does not track
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// Feed lifecycle errors
    #[error("Feed error: {0}")]
    Feed(String),

    /// Budget errors
    #[error("Budget error: {0}")]
    Budget(#[from] BudgetError),

    /// Alert errors
    #[error("Alert error: {0}")]
    Alert(#[from] AlertError),
}

/// Result type alias for telemetry operations
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Budget-related errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BudgetError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid limit: {0}")]
    InvalidLimit(f64),

    #[error("Budget not found: {0}")]
    NotFound(String),

    #[error("Budget already exists: {0}")]
    Duplicate(String),
}

/// Alert-related errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AlertError {
    #[error("Alert not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_and_display() {
        let err: TelemetryError = BudgetError::InvalidLimit(-1.0).into();
        assert_eq!(err.to_string(), "Budget error: Invalid limit: -1");

        let err: TelemetryError = AlertError::NotFound("alert_7".to_string()).into();
        assert!(matches!(err, TelemetryError::Alert(AlertError::NotFound(_))));
    }
}
