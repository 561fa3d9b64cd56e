// Telemetry generation
// Synthetic readings, their generators and the bounded history kept for charts

pub mod generator;
pub mod reading;
pub mod window;

pub use generator::{generate_next, TelemetryGenerator};
pub use reading::{ClassifiedReading, MetricReading};
pub use window::{RollingWindow, DEFAULT_WINDOW_CAPACITY};
