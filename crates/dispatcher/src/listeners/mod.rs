//! Listener implementations
//!
//! Contains LogListener, HealthListener, PointStatsListener, and
//! RecordingListener.

mod health;
mod log;
mod recording;
mod stats;

pub use self::health::HealthListener;
pub use self::log::LogListener;
pub use self::recording::RecordingListener;
pub use self::stats::PointStatsListener;
