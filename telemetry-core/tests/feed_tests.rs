// Feed lifecycle tests
// Time is paused, so every interval fires as soon as the runtime goes idle

use std::time::Duration;
use telemetry_core::{ClassifiedReading, FeedConfig, TelemetryError, TelemetryFeed};
use tokio::sync::broadcast::{error::RecvError, Receiver};
use tokio::time::timeout;

fn single_metric(name: &str) -> FeedConfig {
    let config = FeedConfig::default();
    let metric = config.metric(name).cloned().unwrap();
    FeedConfig {
        metrics: vec![metric],
        ..config
    }
}

async fn next_reading(rx: &mut Receiver<ClassifiedReading>) -> ClassifiedReading {
    timeout(Duration::from_secs(30), rx.recv())
        .await
        .expect("no reading within 30s")
        .expect("feed channel closed")
}

#[tokio::test(start_paused = true)]
async fn test_readings_arrive_on_interval() {
    let mut feed = TelemetryFeed::new(single_metric("plant-a")).unwrap();
    let mut rx = feed.subscribe();
    let started = tokio::time::Instant::now();
    feed.start().unwrap();

    let first = next_reading(&mut rx).await;
    assert_eq!(first.reading.name, "plant-a");
    assert_eq!(started.elapsed(), Duration::from_secs(5));

    next_reading(&mut rx).await;
    assert_eq!(started.elapsed(), Duration::from_secs(10));

    feed.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_offline_metric_is_frozen_until_reconnect() {
    let mut feed = TelemetryFeed::new(single_metric("CO2-001")).unwrap();
    let mut rx = feed.subscribe();
    feed.start().unwrap();

    let before = next_reading(&mut rx).await;
    assert!(before.online);

    feed.set_offline("CO2-001").unwrap();
    for _ in 0..3 {
        let frozen = next_reading(&mut rx).await;
        assert!(!frozen.online);
        assert_eq!(frozen.reading.value, before.reading.value);
        assert_eq!(frozen.reading.timestamp, before.reading.timestamp);
    }

    feed.reconnect("CO2-001").unwrap();
    let resumed = next_reading(&mut rx).await;
    assert!(resumed.online);
    assert_ne!(resumed.reading.value, before.reading.value);

    feed.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_same_seed_same_sequence() {
    async fn run(seed: u64) -> Vec<f64> {
        let config = FeedConfig {
            seed,
            ..single_metric("TEMP-001")
        };
        let mut feed = TelemetryFeed::new(config).unwrap();
        let mut rx = feed.subscribe();
        feed.start().unwrap();

        let mut values = Vec::new();
        for _ in 0..5 {
            values.push(next_reading(&mut rx).await.reading.value);
        }
        feed.stop().await;
        values
    }

    assert_eq!(run(7).await, run(7).await);
    assert_ne!(run(7).await, run(8).await);
}

#[tokio::test(start_paused = true)]
async fn test_values_never_negative() {
    let mut config = single_metric("S1");
    config.metrics[0].initial = 0.05;
    config.metrics[0].magnitude = 1.0;
    config.metrics[0].drift = -0.2;

    let mut feed = TelemetryFeed::new(config).unwrap();
    let mut rx = feed.subscribe();
    feed.start().unwrap();

    for _ in 0..20 {
        assert!(next_reading(&mut rx).await.reading.value >= 0.0);
    }

    feed.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_stop_clears_every_interval() {
    let mut feed = TelemetryFeed::new(FeedConfig::default()).unwrap();
    let mut rx = feed.subscribe();
    feed.start().unwrap();
    next_reading(&mut rx).await;

    feed.stop().await;
    assert!(!feed.is_running());

    // Everything published before the abort drains, then the channel closes
    loop {
        match timeout(Duration::from_secs(60), rx.recv()).await {
            Ok(Ok(_)) | Ok(Err(RecvError::Lagged(_))) => continue,
            Ok(Err(RecvError::Closed)) => break,
            Err(_) => panic!("channel still open after stop"),
        }
    }

    // A stopped feed can be started again on a fresh subscription
    let mut rx = feed.subscribe();
    feed.start().unwrap();
    next_reading(&mut rx).await;
    feed.stop().await;
}

#[tokio::test]
async fn test_command_errors() {
    let mut feed = TelemetryFeed::new(FeedConfig::default()).unwrap();
    assert!(matches!(feed.set_offline("CO2-001"), Err(TelemetryError::Feed(_))));

    feed.start().unwrap();
    assert!(matches!(feed.start(), Err(TelemetryError::Feed(_))));
    assert!(matches!(
        feed.set_offline("CO2-999"),
        Err(TelemetryError::UnknownMetric(name)) if name == "CO2-999"
    ));
    assert!(feed.reconnect("FLOW-001").is_ok());
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = FeedConfig::default();
    config.metrics[0].thresholds = vec![4.0, 4.0];
    assert!(matches!(TelemetryFeed::new(config), Err(TelemetryError::InvalidThresholds(_))));

    let empty = FeedConfig {
        metrics: Vec::new(),
        ..FeedConfig::default()
    };
    assert!(TelemetryFeed::new(empty).is_err());
}
