//! # Feed Pipeline
//!
//! Stream ingestion module.
//!
//! Responsibilities:
//! - Register message sources (supports Mock and Replay)
//! - Forward `FeedEvent`s from source callbacks into one channel
//! - Backpressure management and drop policy
//! - Send to downstream via async-channel
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{build_source, FeedPipeline};
//!
//! let mut pipeline = FeedPipeline::new(100);
//!
//! for source_config in &blueprint.sources {
//!     let source = build_source(source_config)?;
//!     pipeline.register_source(source, None);
//! }
//!
//! pipeline.start_all();
//! let rx = pipeline.take_receiver().unwrap();
//! while let Ok(event) = rx.recv().await {
//!     // Dispatch event
//! }
//! ```

mod adapter;
mod config;
mod error;
mod factory;
mod feed;
mod mock;
mod replay;
mod util;

// Re-exports
pub use adapter::SourceAdapter;
pub use config::{BackpressureConfig, DropPolicy, FeedMetrics, FeedMetricsSnapshot};
pub use contracts::FeedEvent;
pub use error::{FeedError, Result};
pub use factory::build_source;
pub use feed::FeedPipeline;
pub use mock::{MockFeed, MockFeedConfig, ScriptedFault};
pub use replay::{ReplayConfig, ReplayFeed};
pub use util::{pod_slice_to_bytes, send_event};
