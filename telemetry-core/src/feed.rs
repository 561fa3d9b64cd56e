//! Timer-driven telemetry feed
//!
//! Every metric runs in its own task with its own interval. The task owns the
//! metric's generator, so a metric's value is only ever touched by one tick at
//! a time. Classified readings are published on a broadcast channel; offline
//! and reconnect requests reach a task through its command channel.

use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::classification::{Classify, Connectivity, MetricClassifier, ThresholdSet};
use crate::config::{FeedConfig, MetricConfig};
use crate::error::{TelemetryError, TelemetryResult};
use crate::telemetry::{ClassifiedReading, TelemetryGenerator};

/// Readings buffered per subscriber before it starts lagging
const BROADCAST_CAPACITY: usize = 256;

/// Requests a running metric task accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedCommand {
    /// Freeze the metric at its current value
    SetOffline,
    /// Resume generation
    Reconnect,
}

/// Per-metric state owned by one feed task
#[derive(Debug)]
pub struct MetricTask {
    generator: TelemetryGenerator,
    classifier: MetricClassifier,
    connectivity: ThresholdSet<Connectivity>,
    facility: Option<String>,
    budget_id: Option<String>,
    interval: Duration,
    last_advance: Instant,
    /// Extra age for devices that were already silent when the feed started
    stale_offset: Duration,
}

impl MetricTask {
    pub fn new(
        metric: &MetricConfig,
        seed: u64,
        connectivity: ThresholdSet<Connectivity>,
    ) -> TelemetryResult<Self> {
        let stale_offset = if metric.offline {
            connectivity
                .bounds()
                .last()
                .map(|secs| Duration::from_secs_f64(secs.max(0.0)))
                .unwrap_or_default()
        } else {
            Duration::ZERO
        };

        Ok(Self {
            generator: metric.generator(seed),
            classifier: metric.classifier()?,
            connectivity,
            facility: metric.facility.clone(),
            budget_id: metric.budget_id.clone(),
            interval: metric.interval,
            last_advance: Instant::now(),
            stale_offset,
        })
    }

    pub fn name(&self) -> &str {
        self.generator.name()
    }

    /// Advance the generator and classify the result
    pub fn tick(&mut self) -> ClassifiedReading {
        let reading = self.generator.tick(Utc::now());
        if !self.generator.is_offline() {
            self.last_advance = Instant::now();
            self.stale_offset = Duration::ZERO;
        }
        self.classify(reading)
    }

    /// Classify the current value without advancing
    pub fn current(&self) -> ClassifiedReading {
        self.classify(self.generator.current_reading())
    }

    fn classify(&self, reading: crate::telemetry::MetricReading) -> ClassifiedReading {
        let staleness = self.last_advance.elapsed() + self.stale_offset;

        ClassifiedReading {
            status: self.classifier.classify(reading.value),
            connectivity: self.connectivity.classify(staleness.as_secs_f64()),
            online: !self.generator.is_offline(),
            facility: self.facility.clone(),
            budget_id: self.budget_id.clone(),
            reading,
        }
    }

    pub fn apply(&mut self, command: FeedCommand) {
        match command {
            FeedCommand::SetOffline => self.generator.set_offline(),
            FeedCommand::Reconnect => self.generator.reconnect(),
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<FeedCommand>,
        sender: broadcast::Sender<ClassifiedReading>,
    ) {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let classified = self.tick();
                    debug!(
                        "{} = {:.3} {} [{}]",
                        classified.reading.name, classified.reading.value, classified.reading.unit, classified.status
                    );
                    if sender.send(classified).is_err() {
                        debug!("No subscribers for {}", self.name());
                    }
                }
                command = commands.recv() => match command {
                    Some(command) => self.apply(command),
                    None => break,
                }
            }
        }

        debug!("Feed task for {} stopped", self.name());
    }
}

/// Runs one task per configured metric
pub struct TelemetryFeed {
    config: FeedConfig,
    /// Present only while stopped. Running tasks hold the only senders, so the
    /// channel closes once every task has ended.
    sender: Option<broadcast::Sender<ClassifiedReading>>,
    /// Subscriptions are taken from this receiver; it is never read
    receiver: broadcast::Receiver<ClassifiedReading>,
    commands: HashMap<String, mpsc::UnboundedSender<FeedCommand>>,
    handles: Vec<JoinHandle<()>>,
}

impl TelemetryFeed {
    /// Create a feed for a validated configuration
    pub fn new(config: FeedConfig) -> TelemetryResult<Self> {
        config.validate()?;
        let (sender, receiver) = broadcast::channel(BROADCAST_CAPACITY);

        Ok(Self {
            config,
            sender: Some(sender),
            receiver,
            commands: HashMap::new(),
            handles: Vec::new(),
        })
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        !self.handles.is_empty()
    }

    /// Receive every reading published after this call, until the current
    /// run ends. After `stop()` subscribe again for the next run.
    pub fn subscribe(&self) -> broadcast::Receiver<ClassifiedReading> {
        self.receiver.resubscribe()
    }

    /// Classified starting values of every metric, in configuration order
    pub fn initial_readings(&self) -> TelemetryResult<Vec<ClassifiedReading>> {
        self.build_tasks()
            .map(|tasks| tasks.iter().map(MetricTask::current).collect())
    }

    fn build_tasks(&self) -> TelemetryResult<Vec<MetricTask>> {
        let connectivity = self.config.connectivity_thresholds()?;
        self.config
            .metrics
            .iter()
            .enumerate()
            .map(|(index, metric)| MetricTask::new(metric, self.config.metric_seed(index), connectivity.clone()))
            .collect()
    }

    /// Spawn one task per metric. Must be called within a tokio runtime.
    pub fn start(&mut self) -> TelemetryResult<()> {
        if self.is_running() {
            return Err(TelemetryError::Feed("feed is already running".to_string()));
        }

        let tasks = self.build_tasks()?;
        let sender = self
            .sender
            .take()
            .ok_or_else(|| TelemetryError::Feed("feed channel is closed".to_string()))?;

        for task in tasks {
            let (command_tx, command_rx) = mpsc::unbounded_channel();
            self.commands.insert(task.name().to_string(), command_tx);
            self.handles.push(tokio::spawn(task.run(command_rx, sender.clone())));
        }
        drop(sender);

        info!("Telemetry feed started with {} metrics", self.handles.len());
        Ok(())
    }

    fn send(&self, metric: &str, command: FeedCommand) -> TelemetryResult<()> {
        if !self.is_running() {
            return Err(TelemetryError::Feed("feed is not running".to_string()));
        }

        let sender = self
            .commands
            .get(metric)
            .ok_or_else(|| TelemetryError::UnknownMetric(metric.to_string()))?;

        sender
            .send(command)
            .map_err(|_| TelemetryError::Feed(format!("task for {} has stopped", metric)))
    }

    /// Freeze a metric until it is reconnected
    pub fn set_offline(&self, metric: &str) -> TelemetryResult<()> {
        self.send(metric, FeedCommand::SetOffline)
    }

    /// Resume a frozen metric
    pub fn reconnect(&self, metric: &str) -> TelemetryResult<()> {
        self.send(metric, FeedCommand::Reconnect)
    }

    /// Clear every interval and wait for the tasks to finish
    pub async fn stop(&mut self) {
        if !self.is_running() {
            return;
        }

        self.commands.clear();
        for handle in self.handles.drain(..) {
            handle.abort();
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!("Feed task ended abnormally: {}", e);
                }
            }
        }

        // The finished run's channel is closed; the next run gets a fresh one
        let (sender, receiver) = broadcast::channel(BROADCAST_CAPACITY);
        self.sender = Some(sender);
        self.receiver = receiver;

        info!("Telemetry feed stopped");
    }
}

impl Drop for TelemetryFeed {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}
