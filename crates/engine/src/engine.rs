//! The telemetry engine.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock, mpsc};
use tracing::{debug, info, warn};

use roomsense_link::{LinkError, LinkEvent, LinkHandle, LinkStatus, run_link};
use roomsense_protocol::{Actuator, Command, Metric};
use roomsense_telemetry::ChannelStore;

use crate::config::EngineConfig;
use crate::snapshot::{ActuatorSnapshot, ChannelSnapshot, EngineSnapshot};

/// Orchestrates the device link and the channel store.
///
/// Single-writer discipline: the event-loop task spawned by
/// [`start`](Self::start) is the only writer to the store. Everything the
/// presentation layer reads comes out of [`observe`](Self::observe) as an
/// independent copy.
pub struct TelemetryEngine {
    config: EngineConfig,
    store: Arc<RwLock<ChannelStore>>,
    levels: Arc<RwLock<HashMap<Actuator, u8>>>,
    link: Mutex<Option<LinkHandle>>,
    event_task: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl TelemetryEngine {
    /// Creates a stopped engine. Channels exist immediately (empty) so
    /// [`observe`](Self::observe) works before [`start`](Self::start).
    pub fn new(config: EngineConfig) -> Self {
        let store = ChannelStore::new(config.capacity);
        let levels = Actuator::ALL.iter().map(|&a| (a, 0)).collect();

        Self {
            config,
            store: Arc::new(RwLock::new(store)),
            levels: Arc::new(RwLock::new(levels)),
            link: Mutex::new(None),
            event_task: Mutex::new(None),
        }
    }

    /// Seeds the store with warm-up samples and brings the link up.
    /// Calling a running engine again is a no-op.
    pub async fn start(&self) {
        let mut link = self.link.lock().await;
        if link.is_some() {
            debug!("engine already running");
            return;
        }

        self.store.write().await.seed(Utc::now());

        let (events_tx, events_rx) = mpsc::channel(64);
        *link = Some(run_link(
            self.config.endpoint.clone(),
            self.config.retry.clone(),
            events_tx,
        ));

        let store = self.store.clone();
        *self.event_task.lock().await = Some(tokio::spawn(event_loop(events_rx, store)));

        info!(endpoint = %self.config.endpoint, "engine started");
    }

    /// Clamps `level` into 0–100 and forwards it to the device.
    ///
    /// The requested level is recorded immediately so the UI reflects the
    /// intent; a dead link downgrades the send to a warning.
    pub async fn set_actuator(&self, actuator: Actuator, level: i32) {
        let command = Command::new(actuator, level);
        self.levels.write().await.insert(actuator, command.level());

        let result = match self.link.lock().await.as_ref() {
            Some(handle) => handle.send(command).await,
            None => Err(LinkError::NotConnected),
        };
        if let Err(e) = result {
            warn!(
                actuator = actuator.wire_key(),
                level = command.level(),
                "command dropped: {e}"
            );
        }
    }

    /// Stops the link and the event loop. Idempotent; the store keeps its
    /// contents for the life of the engine.
    pub async fn stop(&self) {
        if let Some(handle) = self.link.lock().await.take() {
            handle.shutdown().await;
        }
        if let Some(task) = self.event_task.lock().await.take() {
            let _ = task.await;
        }
        info!("engine stopped");
    }

    /// Copies out connection status, channel windows, and actuator levels.
    /// The sole query surface for the presentation layer.
    pub async fn observe(&self) -> EngineSnapshot {
        let status = match self.link.lock().await.as_ref() {
            Some(handle) => handle.state().await.into(),
            None => LinkStatus::Disconnected,
        };

        let channels = {
            let store = self.store.read().await;
            Metric::ALL
                .iter()
                .map(|&metric| ChannelSnapshot {
                    metric,
                    current: store.current_value(metric),
                    window: store.window(metric),
                })
                .collect()
        };

        let actuators = {
            let levels = self.levels.read().await;
            Actuator::ALL
                .iter()
                .map(|&actuator| ActuatorSnapshot {
                    actuator,
                    level: levels.get(&actuator).copied().unwrap_or(0),
                })
                .collect()
        };

        EngineSnapshot {
            status,
            channels,
            actuators,
        }
    }
}

/// Single-writer loop: drains link events and applies frames to the store.
/// Ends when the link task drops its side of the channel.
async fn event_loop(mut events: mpsc::Receiver<LinkEvent>, store: Arc<RwLock<ChannelStore>>) {
    while let Some(event) = events.recv().await {
        match event {
            LinkEvent::Frame(frame) => {
                if frame.is_empty() {
                    continue;
                }
                store.write().await.apply(&frame, Utc::now());
            }
            LinkEvent::Status(status) => {
                info!(?status, "link status");
            }
            LinkEvent::DecodeError { detail } => {
                warn!(%detail, "device sent a malformed frame");
            }
        }
    }
    debug!("event loop drained");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite;

    use roomsense_link::RetryPolicy;

    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    /// Config pointing at a closed port, with backoff long enough that the
    /// link never interferes with the assertion under test.
    async fn offline_config() -> EngineConfig {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        EngineConfig {
            endpoint: format!("ws://{addr}"),
            capacity: 10,
            retry: RetryPolicy {
                initial_delay: Duration::from_secs(3600),
                ..RetryPolicy::default()
            },
        }
    }

    #[tokio::test]
    async fn start_seeds_every_channel_to_capacity() {
        let engine = TelemetryEngine::new(offline_config().await);
        engine.start().await;

        let snap = engine.observe().await;
        for metric in Metric::ALL {
            let channel = snap.channel(metric).unwrap();
            assert_eq!(channel.window.len(), 10, "{}", metric.name());
            assert!(channel.current > 0.0);
        }

        engine.stop().await;
    }

    #[tokio::test]
    async fn start_twice_does_not_reseed() {
        let engine = TelemetryEngine::new(offline_config().await);
        engine.start().await;
        let first = engine.observe().await;
        engine.start().await;
        let second = engine.observe().await;

        let a = first.channel(Metric::Temperature).unwrap();
        let b = second.channel(Metric::Temperature).unwrap();
        assert_eq!(a.window, b.window);

        engine.stop().await;
    }

    #[tokio::test]
    async fn set_actuator_clamps_and_is_optimistic_offline() {
        let engine = TelemetryEngine::new(offline_config().await);
        engine.start().await;

        // No live link — the send is swallowed, the intent is kept.
        engine.set_actuator(Actuator::Fan, 150).await;
        engine.set_actuator(Actuator::Light, -5).await;

        let snap = engine.observe().await;
        assert_eq!(snap.actuator(Actuator::Fan).unwrap().level, 100);
        assert_eq!(snap.actuator(Actuator::Light).unwrap().level, 0);

        // The store was never touched by command traffic.
        let seeded = snap.channel(Metric::Temperature).unwrap().window.len();
        assert_eq!(seeded, 10);

        engine.stop().await;
    }

    #[tokio::test]
    async fn set_actuator_works_before_start() {
        let engine = TelemetryEngine::new(offline_config().await);
        engine.set_actuator(Actuator::Fan, 40).await;

        let snap = engine.observe().await;
        assert_eq!(snap.actuator(Actuator::Fan).unwrap().level, 40);
        assert_eq!(snap.status, LinkStatus::Disconnected);
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let engine = TelemetryEngine::new(offline_config().await);
        engine.start().await;
        engine.stop().await;
        engine.stop().await;
    }

    #[tokio::test]
    async fn observe_before_start_shows_empty_channels() {
        let engine = TelemetryEngine::new(EngineConfig::default());
        let snap = engine.observe().await;

        assert_eq!(snap.status, LinkStatus::Disconnected);
        for channel in &snap.channels {
            assert!(channel.window.is_empty());
            assert_eq!(channel.current, 0.0);
        }
    }

    #[tokio::test]
    async fn live_frame_replaces_oldest_seeded_sample() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.send(tungstenite::Message::Text(r#"{"temp":25.3}"#.into()))
                .await
                .unwrap();
            while ws.next().await.is_some() {}
        });

        let engine = TelemetryEngine::new(EngineConfig {
            endpoint: format!("ws://{addr}"),
            capacity: 10,
            retry: RetryPolicy::default(),
        });
        engine.start().await;

        // Seeded immediately; the real reading lands shortly after.
        let deadline = tokio::time::Instant::now() + WAIT;
        loop {
            let snap = engine.observe().await;
            let channel = snap.channel(Metric::Temperature).unwrap();
            if channel.current == 25.3 {
                assert_eq!(channel.window.len(), 10);
                assert_eq!(channel.window.last().unwrap().value, 25.3);
                break;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "frame never reached the store"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        engine.stop().await;
        server.abort();
    }

    #[tokio::test]
    async fn malformed_frame_leaves_channels_alone() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (sent_tx, sent_rx) = tokio::sync::oneshot::channel::<()>();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.send(tungstenite::Message::Text("not json".into()))
                .await
                .unwrap();
            // A valid marker frame afterwards proves the session survived.
            ws.send(tungstenite::Message::Text(r#"{"humidity":42.0}"#.into()))
                .await
                .unwrap();
            let _ = sent_tx.send(());
            while ws.next().await.is_some() {}
        });

        let engine = TelemetryEngine::new(EngineConfig {
            endpoint: format!("ws://{addr}"),
            capacity: 10,
            retry: RetryPolicy::default(),
        });
        engine.start().await;
        let seeded = engine.observe().await;
        let seeded_temp = seeded.channel(Metric::Temperature).unwrap().window.clone();

        tokio::time::timeout(WAIT, sent_rx).await.unwrap().unwrap();

        let deadline = tokio::time::Instant::now() + WAIT;
        loop {
            let snap = engine.observe().await;
            if snap.channel(Metric::Humidity).unwrap().current == 42.0 {
                // The bad frame changed nothing else.
                assert_eq!(
                    snap.channel(Metric::Temperature).unwrap().window,
                    seeded_temp
                );
                assert_eq!(snap.status, LinkStatus::Connected);
                break;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "marker frame never arrived"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        engine.stop().await;
        server.abort();
    }
}
