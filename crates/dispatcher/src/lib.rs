//! # Dispatcher
//!
//! 事件分发模块。
//!
//! 负责：
//! - 消费 `FeedEvent`
//! - 按监听掩码 fan-out 到各 listener
//! - 故障广播给所有 listener (不看掩码)
//! - 隔离慢 listener，不阻塞主链路

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod listeners;
pub mod metrics;

pub use contracts::{FeedEvent, MessageListener};
pub use dispatcher::{Dispatcher, DispatcherBuilder, DispatcherConfig, create_dispatcher};
pub use error::DispatcherError;
pub use handle::ListenerHandle;
pub use listeners::{HealthListener, LogListener, PointStatsListener, RecordingListener};
pub use metrics::{ListenerMetrics, MetricsSnapshot};
