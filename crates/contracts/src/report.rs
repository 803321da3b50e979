//! Fault reporting seam
//!
//! The default `MessageListener::on_error` routes its diagnostic through an
//! `ErrorReporter`, so tests can observe the notification without capturing
//! process-level stderr.

use crate::StreamError;

/// Output channel for listener fault diagnostics.
pub trait ErrorReporter: Send + Sync {
    /// Emit one human-readable diagnostic line for `error`.
    fn report(&self, error: &StreamError);
}

/// Reporter writing to the process standard error stream.
///
/// Connection-loss diagnostics carry reconnect advice: SENSR does not
/// recover a dropped stream on its own, the operator has to reconnect.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrReporter;

impl ErrorReporter for StderrReporter {
    fn report(&self, error: &StreamError) {
        match error {
            StreamError::Connection { .. } => eprintln!("{error}. Please reconnect."),
            StreamError::Decode { .. } | StreamError::Internal { .. } => eprintln!("{error}"),
        }
    }
}
