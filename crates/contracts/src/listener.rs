//! MessageListener - the client subscription contract

use crate::{
    ErrorReporter, ListeningType, OutputMessage, PointResult, StderrReporter, StreamError,
};

/// Observer receiving SENSR stream events.
///
/// A listener is constructed with a subscription mask that stays fixed for
/// its whole lifetime: `subscriptions` must return the same value on every
/// call, and no mutator exists. The capability queries derive from that one
/// accessor, so they are pure, idempotent and always consistent with the
/// mask chosen at construction.
///
/// Listeners are passive callback targets. The dispatcher owns threading
/// and delivery policy; it snapshots the mask once at registration, invokes
/// the delivery hooks only for subscribed categories, and invokes `on_error`
/// for every fault regardless of mask.
pub trait MessageListener: Send {
    /// Subscription mask chosen at construction. Must be stable.
    fn subscriptions(&self) -> ListeningType;

    /// Whether raw output messages are subscribed
    fn is_output_message_listening(&self) -> bool {
        self.subscriptions()
            .contains(ListeningType::OUTPUT_MESSAGE)
    }

    /// Whether derived point results are subscribed
    fn is_point_result_listening(&self) -> bool {
        self.subscriptions().contains(ListeningType::POINT_RESULT)
    }

    /// Delivery hook for output messages. Only called when
    /// `is_output_message_listening` is true.
    fn on_output_message(&mut self, _message: &OutputMessage) {}

    /// Delivery hook for point results. Only called when
    /// `is_point_result_listening` is true.
    fn on_point_result(&mut self, _result: &PointResult) {}

    /// Reporter the default `on_error` writes through. Override to inject
    /// a different output channel.
    fn error_reporter(&self) -> &dyn ErrorReporter {
        &StderrReporter
    }

    /// Fault notification.
    ///
    /// The default surfaces connection loss through `error_reporter` and
    /// consumes every other kind without output. The match is exhaustive:
    /// a new fault kind will not compile until it gets an arm here.
    ///
    /// Notification-only: the default neither retries nor mutates listener
    /// state, and nothing propagates back to the dispatcher.
    fn on_error(&mut self, error: &StreamError) {
        match error {
            StreamError::Connection { .. } => self.error_reporter().report(error),
            // Not actionable by an operator at this layer; overriding
            // listeners may still surface them.
            StreamError::Decode { .. } | StreamError::Internal { .. } => {}
        }
    }
}
