//! HealthListener - surfaces degraded components from health reports

use contracts::{ListeningType, MessageListener, OutputMessage, SystemHealth};
use tracing::{debug, warn};

/// Listener that watches embedded health reports and warns on any
/// component that is not `Good`.
///
/// The mask is pinned to `OUTPUT_MESSAGE` since health reports only ride
/// on output messages. Fault handling stays on the trait default, so a
/// connection loss reaches the operator through the stderr reporter.
pub struct HealthListener {
    name: String,
    reports_seen: u64,
}

impl HealthListener {
    /// Create a new HealthListener with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reports_seen: 0,
        }
    }

    /// Number of health reports inspected so far
    pub fn reports_seen(&self) -> u64 {
        self.reports_seen
    }

    fn inspect(&self, health: &SystemHealth) {
        let mut degraded = 0usize;

        if !health.master.is_good() {
            degraded += 1;
            warn!(
                listener = %self.name,
                status = ?health.master,
                "master unhealthy"
            );
        }

        for (address, node) in &health.nodes {
            if !node.status.is_good() {
                degraded += 1;
                warn!(
                    listener = %self.name,
                    node = %address,
                    status = ?node.status,
                    "node unhealthy"
                );
            }

            for (serial, status) in &node.sensors {
                if !status.is_good() {
                    degraded += 1;
                    warn!(
                        listener = %self.name,
                        node = %address,
                        sensor = %serial,
                        status = ?status,
                        "sensor unhealthy"
                    );
                }
            }
        }

        if degraded == 0 {
            debug!(listener = %self.name, nodes = health.nodes.len(), "system healthy");
        }
    }
}

impl MessageListener for HealthListener {
    fn subscriptions(&self) -> ListeningType {
        ListeningType::OUTPUT_MESSAGE
    }

    fn on_output_message(&mut self, message: &OutputMessage) {
        if let Some(health) = message.health() {
            self.reports_seen += 1;
            self.inspect(health);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{HealthStatus, NodeHealth, ObjectStream};
    use std::collections::BTreeMap;

    fn message_with_health(health: SystemHealth) -> OutputMessage {
        OutputMessage {
            timestamp: 1.0,
            stream: Some(ObjectStream {
                objects: vec![],
                health: Some(health),
            }),
            event: None,
        }
    }

    #[test]
    fn test_mask_is_pinned_to_output() {
        let listener = HealthListener::new("health");
        assert!(listener.is_output_message_listening());
        assert!(!listener.is_point_result_listening());
    }

    #[test]
    fn test_counts_only_messages_with_reports() {
        let mut listener = HealthListener::new("health");

        listener.on_output_message(&OutputMessage {
            timestamp: 1.0,
            stream: None,
            event: None,
        });
        assert_eq!(listener.reports_seen(), 0);

        let health = SystemHealth {
            master: HealthStatus::Good,
            nodes: BTreeMap::new(),
        };
        listener.on_output_message(&message_with_health(health));
        assert_eq!(listener.reports_seen(), 1);
    }

    #[test]
    fn test_degraded_report_is_inspected() {
        let mut listener = HealthListener::new("health");

        let mut sensors = BTreeMap::new();
        sensors.insert("lidar-front".to_string(), HealthStatus::Bad);
        let mut nodes = BTreeMap::new();
        nodes.insert(
            "10.0.0.2".to_string(),
            NodeHealth {
                status: HealthStatus::Degraded,
                sensors,
            },
        );
        let health = SystemHealth {
            master: HealthStatus::Good,
            nodes,
        };

        listener.on_output_message(&message_with_health(health));
        assert_eq!(listener.reports_seen(), 1);
    }
}
