//! Session statistics and metrics.

use std::time::Duration;

use dispatcher::MetricsSnapshot;
use observability::StreamStatsAggregator;

/// Statistics from a session run
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Total messages received from the feed
    pub messages_received: u64,

    /// Total faults received from the feed
    pub faults_received: u64,

    /// Total duration of the session
    pub duration: Duration,

    /// Number of sources that were active
    pub active_sources: usize,

    /// Number of listeners that received data
    pub active_listeners: usize,

    /// Stream content aggregator
    pub stream_stats: StreamStatsAggregator,

    /// Final per-listener delivery counters
    pub listener_stats: Vec<(String, MetricsSnapshot)>,
}

impl SessionStats {
    /// Calculate messages per second throughput
    pub fn message_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.messages_received as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Session Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Messages received: {}", self.messages_received);
        println!("   ├─ Faults received: {}", self.faults_received);
        println!("   ├─ Rate: {:.2} msg/s", self.message_rate());
        println!("   ├─ Active sources: {}", self.active_sources);
        println!("   └─ Active listeners: {}", self.active_listeners);

        let summary = self.stream_stats.summary();

        println!("\n📈 Stream Metrics");
        println!(
            "   ├─ Output messages: {} / point results: {}",
            summary.output_messages, summary.point_results
        );
        println!(
            "   ├─ Zone events: {} entries, {} exits",
            summary.zone_entries, summary.zone_exits
        );
        println!("   ├─ Losing events: {}", summary.losing_events);
        println!(
            "   ├─ Health reports: {} (unhealthy: {})",
            summary.health_reports, summary.unhealthy_reports
        );
        println!("   ├─ Objects/message: {}", summary.objects_per_message);
        println!("   └─ Points/result: {}", summary.points_per_result);

        if !self.listener_stats.is_empty() {
            println!("\n📤 Listener Delivery");
            for (i, (name, snapshot)) in self.listener_stats.iter().enumerate() {
                let is_last = i == self.listener_stats.len() - 1;
                let prefix = if is_last { "└─" } else { "├─" };
                println!(
                    "   {} {}: delivered {}, skipped {}, dropped {}, faults {}",
                    prefix,
                    name,
                    snapshot.delivered_count,
                    snapshot.skipped_count,
                    snapshot.dropped_count,
                    snapshot.fault_count
                );
            }
        }

        if !summary.fault_counts.is_empty() {
            println!("\n⚠️  Fault Counts");
            for (kind, count) in &summary.fault_counts {
                println!("   ├─ {}: {}", kind, count);
            }
        }

        println!();
    }
}
