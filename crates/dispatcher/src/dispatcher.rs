//! Dispatcher - routes feed events to listener workers

use std::sync::Arc;

use contracts::{FeedEvent, ListenerConfig, ListenerKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use crate::error::{DispatcherError, Result};
use crate::handle::ListenerHandle;
use crate::listeners::{HealthListener, LogListener, PointStatsListener, RecordingListener};
use crate::metrics::ListenerMetrics;

/// Dispatcher configuration
#[derive(Debug, Clone, Default)]
pub struct DispatcherConfig {
    /// Listeners to register
    pub listeners: Vec<ListenerConfig>,
}

/// Builder for the dispatcher
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    input_rx: Option<mpsc::Receiver<FeedEvent>>,
}

impl DispatcherBuilder {
    /// Create a new builder with the given config
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            config,
            input_rx: None,
        }
    }

    /// Set the input event channel
    pub fn with_input(mut self, rx: mpsc::Receiver<FeedEvent>) -> Self {
        self.input_rx = Some(rx);
        self
    }

    /// Build the dispatcher, spawning one worker per configured listener
    pub fn build(self) -> Result<Dispatcher> {
        let input_rx = self.input_rx.ok_or_else(|| {
            DispatcherError::listener_creation("dispatcher", "input channel not set")
        })?;

        let mut handles = Vec::with_capacity(self.config.listeners.len());
        for listener_config in &self.config.listeners {
            let handle = create_listener_handle(listener_config)?;
            handles.push(handle);
        }

        info!(listeners = handles.len(), "dispatcher built");

        Ok(Dispatcher { handles, input_rx })
    }
}

/// Create a listener handle from config
fn create_listener_handle(config: &ListenerConfig) -> Result<ListenerHandle> {
    let subscriptions = config.effective_subscription();

    let handle = match config.kind {
        ListenerKind::Log => ListenerHandle::spawn(
            &config.name,
            LogListener::new(&config.name, subscriptions),
            config.queue_capacity,
        ),
        ListenerKind::Health => ListenerHandle::spawn(
            &config.name,
            HealthListener::new(&config.name),
            config.queue_capacity,
        ),
        ListenerKind::PointStats => ListenerHandle::spawn(
            &config.name,
            PointStatsListener::new(&config.name),
            config.queue_capacity,
        ),
        ListenerKind::Recording => {
            let listener =
                RecordingListener::from_params(&config.name, subscriptions, &config.params)
                    .map_err(|e| {
                        DispatcherError::listener_creation(&config.name, e.to_string())
                    })?;
            ListenerHandle::spawn(&config.name, listener, config.queue_capacity)
        }
    };

    Ok(handle)
}

/// Routes feed events to listener workers.
///
/// Messages go only to listeners whose mask covers the category; faults
/// are broadcast to every listener regardless of mask.
pub struct Dispatcher {
    handles: Vec<ListenerHandle>,
    input_rx: mpsc::Receiver<FeedEvent>,
}

impl Dispatcher {
    /// Create a dispatcher from pre-spawned handles
    pub fn with_handles(handles: Vec<ListenerHandle>, input_rx: mpsc::Receiver<FeedEvent>) -> Self {
        Self { handles, input_rx }
    }

    /// Per-listener metrics, in registration order
    pub fn metrics(&self) -> Vec<(String, Arc<ListenerMetrics>)> {
        self.handles
            .iter()
            .map(|handle| (handle.name().to_string(), Arc::clone(handle.metrics())))
            .collect()
    }

    /// Run the dispatch loop until the input channel closes, then shut
    /// down all listener workers.
    #[instrument(name = "dispatcher_run", skip(self))]
    pub async fn run(mut self) {
        info!(listeners = self.handles.len(), "dispatcher started");

        let mut event_count: u64 = 0;
        while let Some(event) = self.input_rx.recv().await {
            event_count += 1;
            self.dispatch_event(event);

            if event_count.is_multiple_of(100) {
                debug!(event_count, "dispatch progress");
            }
        }

        info!(event_count, "input channel closed, shutting down listeners");
        Self::shutdown_handles(self.handles).await;
    }

    /// Spawn the dispatch loop as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    fn dispatch_event(&self, event: FeedEvent) {
        match event {
            FeedEvent::Message(message) => {
                for handle in &self.handles {
                    if handle.wants(&message) {
                        handle.try_send(FeedEvent::Message(message.clone()));
                    } else {
                        handle.metrics().inc_skipped_count();
                    }
                }
            }
            FeedEvent::Fault(error) => {
                for handle in &self.handles {
                    handle.try_send(FeedEvent::Fault(error.clone()));
                }
            }
        }
    }

    async fn shutdown_handles(handles: Vec<ListenerHandle>) {
        for handle in handles {
            handle.shutdown().await;
        }
    }
}

/// Create a dispatcher from config and an input channel (convenience)
pub fn create_dispatcher(
    config: DispatcherConfig,
    input_rx: mpsc::Receiver<FeedEvent>,
) -> Result<Dispatcher> {
    DispatcherBuilder::new(config).with_input(input_rx).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        ListeningType, MessageListener, OutputMessage, PointResult, StreamError, StreamMessage,
    };
    use std::sync::atomic::{AtomicU64, Ordering};

    struct CountingListener {
        mask: ListeningType,
        outputs: Arc<AtomicU64>,
        points: Arc<AtomicU64>,
        faults: Arc<AtomicU64>,
    }

    impl CountingListener {
        fn new(mask: ListeningType) -> Self {
            Self {
                mask,
                outputs: Arc::new(AtomicU64::new(0)),
                points: Arc::new(AtomicU64::new(0)),
                faults: Arc::new(AtomicU64::new(0)),
            }
        }

        fn counters(&self) -> (Arc<AtomicU64>, Arc<AtomicU64>, Arc<AtomicU64>) {
            (
                Arc::clone(&self.outputs),
                Arc::clone(&self.points),
                Arc::clone(&self.faults),
            )
        }
    }

    impl MessageListener for CountingListener {
        fn subscriptions(&self) -> ListeningType {
            self.mask
        }

        fn on_output_message(&mut self, _message: &OutputMessage) {
            self.outputs.fetch_add(1, Ordering::SeqCst);
        }

        fn on_point_result(&mut self, _result: &PointResult) {
            self.points.fetch_add(1, Ordering::SeqCst);
        }

        fn on_error(&mut self, _error: &StreamError) {
            self.faults.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn output_event(timestamp: f64) -> FeedEvent {
        FeedEvent::Message(StreamMessage::Output(OutputMessage {
            timestamp,
            stream: None,
            event: None,
        }))
    }

    fn point_event(timestamp: f64) -> FeedEvent {
        FeedEvent::Message(StreamMessage::PointResult(PointResult {
            timestamp,
            clouds: vec![],
        }))
    }

    #[tokio::test]
    async fn test_messages_follow_masks() {
        let output_only = CountingListener::new(ListeningType::OUTPUT_MESSAGE);
        let (oo_outputs, oo_points, _) = output_only.counters();
        let points_only = CountingListener::new(ListeningType::POINT_RESULT);
        let (po_outputs, po_points, _) = points_only.counters();

        let handles = vec![
            ListenerHandle::spawn("outputs", output_only, 16),
            ListenerHandle::spawn("points", points_only, 16),
        ];
        let (tx, rx) = mpsc::channel(16);
        let dispatcher = Dispatcher::with_handles(handles, rx);
        let metrics = dispatcher.metrics();
        let task = dispatcher.spawn();

        tx.send(output_event(1.0)).await.unwrap();
        tx.send(point_event(2.0)).await.unwrap();
        tx.send(output_event(3.0)).await.unwrap();
        drop(tx);
        task.await.unwrap();

        assert_eq!(oo_outputs.load(Ordering::SeqCst), 2);
        assert_eq!(oo_points.load(Ordering::SeqCst), 0);
        assert_eq!(po_outputs.load(Ordering::SeqCst), 0);
        assert_eq!(po_points.load(Ordering::SeqCst), 1);

        // Skip accounting mirrors the gating.
        let (_, output_metrics) = &metrics[0];
        assert_eq!(output_metrics.skipped_count(), 1);
        assert_eq!(output_metrics.delivered_count(), 2);
        let (_, point_metrics) = &metrics[1];
        assert_eq!(point_metrics.skipped_count(), 2);
        assert_eq!(point_metrics.delivered_count(), 1);
    }

    #[tokio::test]
    async fn test_faults_broadcast_to_all() {
        let subscribed = CountingListener::new(ListeningType::all());
        let (_, _, sub_faults) = subscribed.counters();
        let unsubscribed = CountingListener::new(ListeningType::empty());
        let (un_outputs, _, un_faults) = unsubscribed.counters();

        let handles = vec![
            ListenerHandle::spawn("subscribed", subscribed, 16),
            ListenerHandle::spawn("unsubscribed", unsubscribed, 16),
        ];
        let (tx, rx) = mpsc::channel(16);
        let task = Dispatcher::with_handles(handles, rx).spawn();

        tx.send(output_event(1.0)).await.unwrap();
        tx.send(FeedEvent::Fault(StreamError::connection("link down")))
            .await
            .unwrap();
        tx.send(FeedEvent::Fault(StreamError::decode("bad line")))
            .await
            .unwrap();
        drop(tx);
        task.await.unwrap();

        // Even the empty-mask listener hears every fault.
        assert_eq!(sub_faults.load(Ordering::SeqCst), 2);
        assert_eq!(un_faults.load(Ordering::SeqCst), 2);
        assert_eq!(un_outputs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_builder_spawns_configured_listeners() {
        let config = DispatcherConfig {
            listeners: vec![
                ListenerConfig {
                    name: "log".to_string(),
                    kind: ListenerKind::Log,
                    subscribe: Some(ListeningType::OUTPUT_MESSAGE),
                    queue_capacity: 8,
                    params: Default::default(),
                },
                ListenerConfig {
                    name: "stats".to_string(),
                    kind: ListenerKind::PointStats,
                    subscribe: None,
                    queue_capacity: 8,
                    params: Default::default(),
                },
            ],
        };

        let (tx, rx) = mpsc::channel(8);
        let dispatcher = create_dispatcher(config, rx).unwrap();
        let metrics = dispatcher.metrics();
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].0, "log");

        let task = dispatcher.spawn();
        tx.send(point_event(1.0)).await.unwrap();
        drop(tx);
        task.await.unwrap();

        // Log listener was restricted to outputs, so the point skipped it.
        assert_eq!(metrics[0].1.skipped_count(), 1);
        assert_eq!(metrics[1].1.delivered_count(), 1);
    }

    #[tokio::test]
    async fn test_recording_listener_creation_fails_without_dir() {
        let config = DispatcherConfig {
            listeners: vec![ListenerConfig {
                name: "rec".to_string(),
                kind: ListenerKind::Recording,
                subscribe: None,
                queue_capacity: 8,
                params: Default::default(),
            }],
        };

        let (_tx, rx) = mpsc::channel::<FeedEvent>(8);
        let result = DispatcherBuilder::new(config).with_input(rx).build();
        assert!(matches!(
            result,
            Err(DispatcherError::ListenerCreation { .. })
        ));
    }
}
