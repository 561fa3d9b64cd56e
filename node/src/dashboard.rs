use std::future::Future;
use std::time::Duration;
use telemetry_core::{ClassifiedReading, DashboardMonitor, DashboardSnapshot, TelemetryFeed};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::config::{NodeConfig, NodeConfigError};

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured run time elapsed
    Elapsed,
    /// Ctrl+C
    Interrupted,
    /// Every feed task is gone
    FeedClosed,
}

/// Owns the feed and the monitor for one run
pub struct DashboardRunner {
    feed: TelemetryFeed,
    monitor: DashboardMonitor,
}

impl DashboardRunner {
    pub fn new(config: &NodeConfig) -> Result<Self, NodeConfigError> {
        let feed = TelemetryFeed::new(config.feed.clone())?;
        let monitor = DashboardMonitor::new(&config.feed, config.budgets.tracker()?, config.alerts.clone());

        Ok(Self { feed, monitor })
    }

    pub fn feed(&self) -> &TelemetryFeed {
        &self.feed
    }

    pub fn monitor(&self) -> &DashboardMonitor {
        &self.monitor
    }

    /// Run until `run_for` elapses or Ctrl+C, then stop the feed and return
    /// the final dashboard state.
    pub async fn run(&mut self, run_for: Option<Duration>) -> anyhow::Result<(StopReason, DashboardSnapshot)> {
        self.monitor.seed(self.feed.initial_readings()?);
        let (online, total) = self.monitor.online_sensors();
        info!("Dashboard seeded, {}/{} sensors online", online, total);

        let mut readings = self.feed.subscribe();
        self.feed.start()?;

        let reason = self.consume(&mut readings, run_for, tokio::signal::ctrl_c()).await;

        info!("Stopping dashboard: {:?}", reason);
        self.feed.stop().await;

        Ok((reason, self.monitor.snapshot()))
    }

    /// Ingest readings until the deadline, the interrupt, or the channel closing
    async fn consume<F>(
        &mut self,
        readings: &mut broadcast::Receiver<ClassifiedReading>,
        run_for: Option<Duration>,
        interrupted: F,
    ) -> StopReason
    where
        F: Future<Output = std::io::Result<()>>,
    {
        let deadline = async {
            match run_for {
                Some(duration) => tokio::time::sleep(duration).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);
        tokio::pin!(interrupted);

        loop {
            tokio::select! {
                _ = &mut deadline => break StopReason::Elapsed,
                result = &mut interrupted => {
                    if let Err(e) = result {
                        warn!("Failed to listen for Ctrl+C: {}", e);
                    }
                    break StopReason::Interrupted;
                }
                received = readings.recv() => match received {
                    Ok(reading) => self.handle(reading),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Dashboard fell behind, skipped {} readings", skipped);
                    }
                    Err(RecvError::Closed) => break StopReason::FeedClosed,
                }
            }
        }
    }

    fn handle(&mut self, reading: ClassifiedReading) {
        let previous = self
            .monitor
            .latest(&reading.reading.name)
            .map(|r| r.connectivity);

        if let Some(previous) = previous {
            if previous != reading.connectivity {
                info!(
                    "{} connectivity {} -> {}",
                    reading.reading.name, previous, reading.connectivity
                );
            }
        }

        let alerts = self.monitor.ingest(&reading);
        if !alerts.is_empty() {
            debug!("{} raised {} alert(s)", reading.reading.name, alerts.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_after_deadline() {
        let mut runner = DashboardRunner::new(&NodeConfig::default()).unwrap();
        let (reason, snapshot) = runner.run(Some(Duration::from_secs(31))).await.unwrap();

        assert_eq!(reason, StopReason::Elapsed);
        assert!(!runner.feed().is_running());
        assert_eq!(snapshot.sensors_total, 6);
        assert_eq!(snapshot.budgets.len(), 3);
        // Ticks at 2s..=30s plus the seeded value
        assert_eq!(snapshot.series["CO2-001"].len(), 16);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ends_when_every_task_ends() {
        let config = NodeConfig::default();
        let mut runner = DashboardRunner::new(&config).unwrap();
        let mut feed = TelemetryFeed::new(config.feed.clone()).unwrap();
        let mut readings = feed.subscribe();
        feed.start().unwrap();

        let (reason, ()) = tokio::join!(
            runner.consume(&mut readings, None, std::future::pending()),
            async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                feed.stop().await;
            }
        );

        assert_eq!(reason, StopReason::FeedClosed);
        assert!(runner.monitor().latest("CO2-001").is_some());
    }

    #[test]
    fn test_invalid_budgets_fail_construction() {
        let mut config = NodeConfig::default();
        config.budgets.entries[0].limit = -1.0;
        assert!(matches!(DashboardRunner::new(&config), Err(NodeConfigError::Budget(_))));
    }
}
