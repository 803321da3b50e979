//! LogListener - logs message summaries via tracing

use contracts::{ListeningType, MessageListener, OutputMessage, PointResult, StreamError};
use tracing::{info, warn};

/// Listener that logs message summaries for debugging.
///
/// Subscribes to whatever mask it is constructed with, so a blueprint can
/// point it at either category or both.
pub struct LogListener {
    name: String,
    subscriptions: ListeningType,
}

impl LogListener {
    /// Create a new LogListener with the given name and subscription mask
    pub fn new(name: impl Into<String>, subscriptions: ListeningType) -> Self {
        Self {
            name: name.into(),
            subscriptions,
        }
    }

    fn log_output_summary(&self, message: &OutputMessage) {
        info!(
            listener = %self.name,
            timestamp = message.timestamp,
            objects = message.object_count(),
            zone_events = message.zone_events().len(),
            losing_events = message.losing_events().len(),
            has_health = message.health().is_some(),
            "OutputMessage received"
        );
    }

    fn log_point_summary(&self, result: &PointResult) {
        info!(
            listener = %self.name,
            timestamp = result.timestamp,
            clouds = result.clouds.len(),
            points = result.total_points(),
            "PointResult received"
        );
    }
}

impl MessageListener for LogListener {
    fn subscriptions(&self) -> ListeningType {
        self.subscriptions
    }

    fn on_output_message(&mut self, message: &OutputMessage) {
        self.log_output_summary(message);
    }

    fn on_point_result(&mut self, result: &PointResult) {
        self.log_point_summary(result);
    }

    fn on_error(&mut self, error: &StreamError) {
        warn!(
            listener = %self.name,
            kind = error.kind(),
            error = %error,
            "stream fault"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_listener_mask() {
        let listener = LogListener::new("log", ListeningType::OUTPUT_MESSAGE);
        assert!(listener.is_output_message_listening());
        assert!(!listener.is_point_result_listening());
    }

    #[test]
    fn test_log_listener_handles_empty_message() {
        let mut listener = LogListener::new("log", ListeningType::all());
        let message = OutputMessage {
            timestamp: 1.0,
            stream: None,
            event: None,
        };
        listener.on_output_message(&message);

        let result = PointResult {
            timestamp: 2.0,
            clouds: vec![],
        };
        listener.on_point_result(&result);
    }
}
