//! 数据源适配器
//!
//! 基于 `MessageSource` trait 的统一适配器实现。
//! 安装转发回调，登记 metrics 并应用背压策略，
//! 使 FeedPipeline 以统一方式处理 Mock 和 Replay 源。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_channel::Sender;
use contracts::{FeedCallback, FeedEvent, MessageSource};
use tracing::{debug, trace};

use crate::config::{BackpressureConfig, FeedMetrics};
use crate::util::send_event;

/// 单个数据源到 feed 通道的适配器
pub struct SourceAdapter {
    source_id: String,
    source: Box<dyn MessageSource>,
    config: BackpressureConfig,
    forwarding: Arc<AtomicBool>,
}

impl SourceAdapter {
    /// 创建新的适配器
    pub fn new(
        source_id: String,
        source: Box<dyn MessageSource>,
        config: BackpressureConfig,
    ) -> Self {
        Self {
            source_id,
            source,
            config,
            forwarding: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 数据源 ID
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// 开始把事件转发进 `tx`。幂等。
    pub fn start(&self, tx: Sender<FeedEvent>, metrics: Arc<FeedMetrics>) {
        if self.forwarding.swap(true, Ordering::SeqCst) {
            return;
        }

        let source_id = self.source_id.clone();
        let drop_policy = self.config.drop_policy;
        let forwarding = self.forwarding.clone();

        debug!(source_id = %source_id, "starting source adapter");

        let callback: FeedCallback = Arc::new(move |event| {
            if !forwarding.load(Ordering::Relaxed) {
                return;
            }

            match &event {
                FeedEvent::Message(_) => metrics.record_received(),
                FeedEvent::Fault(_) => metrics.record_fault(),
            }
            metrics.update_queue_len(tx.len());
            trace!(source_id = %source_id, "source adapter received event");
            send_event(&tx, event, &metrics, &source_id, drop_policy);
        });

        self.source.listen(callback);
    }

    /// 停止转发。幂等。
    pub fn stop(&self) {
        if self.forwarding.swap(false, Ordering::SeqCst) {
            debug!(source_id = %self.source_id, "stopping source adapter");
            self.source.stop();
        }
    }

    /// 适配器是否正在转发
    pub fn is_listening(&self) -> bool {
        self.forwarding.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_channel::bounded;
    use contracts::{DropPolicy, PointResult, StreamMessage};
    use std::time::Duration;

    /// Source emitting point results on a background thread
    #[derive(Debug)]
    struct TestSource {
        source_id: String,
        listening: Arc<AtomicBool>,
    }

    impl TestSource {
        fn new(source_id: &str) -> Self {
            Self {
                source_id: source_id.to_string(),
                listening: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    impl MessageSource for TestSource {
        fn source_id(&self) -> &str {
            &self.source_id
        }

        fn listen(&self, callback: FeedCallback) {
            if self.listening.swap(true, Ordering::SeqCst) {
                return;
            }

            let listening = self.listening.clone();

            std::thread::spawn(move || {
                let mut tick = 0u64;
                while listening.load(Ordering::Relaxed) {
                    tick += 1;
                    callback(FeedEvent::Message(StreamMessage::PointResult(
                        PointResult {
                            timestamp: tick as f64 * 0.1,
                            clouds: vec![],
                        },
                    )));
                    std::thread::sleep(Duration::from_millis(10));
                }
            });
        }

        fn stop(&self) {
            self.listening.store(false, Ordering::SeqCst);
        }

        fn is_listening(&self) -> bool {
            self.listening.load(Ordering::Relaxed)
        }
    }

    #[test]
    fn adapter_forwards_events() {
        let adapter = SourceAdapter::new(
            "test".to_string(),
            Box::new(TestSource::new("test")),
            BackpressureConfig {
                channel_capacity: 32,
                drop_policy: DropPolicy::DropNewest,
            },
        );

        let (tx, rx) = bounded(32);
        let metrics = Arc::new(FeedMetrics::new());

        adapter.start(tx, metrics.clone());
        assert!(adapter.is_listening());

        // Wait for some events
        std::thread::sleep(Duration::from_millis(100));

        adapter.stop();
        assert!(!adapter.is_listening());

        let mut count = 0u64;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        assert!(count > 0, "adapter should have forwarded events");
        assert!(metrics.snapshot().events_received >= count);
    }

    #[test]
    fn start_is_idempotent() {
        let adapter = SourceAdapter::new(
            "test".to_string(),
            Box::new(TestSource::new("test")),
            BackpressureConfig::default(),
        );

        let (tx, _rx) = bounded(8);
        let metrics = Arc::new(FeedMetrics::new());

        adapter.start(tx.clone(), metrics.clone());
        adapter.start(tx, metrics);
        assert!(adapter.is_listening());
        adapter.stop();
    }
}
