//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Wall-clock unix timestamp (seconds, f64) is the primary clock across the stream

mod blueprint;
mod error;
mod listener;
mod listening;
mod output;
mod points;
mod report;
mod source;
mod stream;

pub use blueprint::*;
pub use error::*;
pub use listener::MessageListener;
pub use listening::ListeningType;
pub use output::*;
pub use points::*;
pub use report::{ErrorReporter, StderrReporter};
pub use source::{FeedCallback, MessageSource};
pub use stream::{FeedEvent, StreamMessage};
