//! 流消息指标收集模块
//!
//! 基于 StreamMessage 收集和统计客户端会话的运行指标。

use std::collections::HashMap;

use contracts::{StreamMessage, SystemHealth, ZoneEventKind};
use metrics::{counter, gauge, histogram};

/// 从流消息记录指标
///
/// 每次从 feed 通道取出消息时调用此函数来记录指标。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_stream_message;
///
/// if let FeedEvent::Message(message) = event {
///     record_stream_message(&message);
///     // ...
/// }
/// ```
pub fn record_stream_message(message: &StreamMessage) {
    // 消息计数器 (按类别)
    counter!(
        "sensr_watch_messages_total",
        "category" => message.category_label()
    )
    .increment(1);

    // 最后消息时间戳 (用于检测断流)
    gauge!("sensr_watch_last_message_timestamp").set(message.timestamp());

    match message {
        StreamMessage::Output(output) => {
            // 当前跟踪目标数
            let objects = output.object_count();
            gauge!("sensr_watch_tracked_objects").set(objects as f64);
            histogram!("sensr_watch_objects_per_message").record(objects as f64);

            // 区域事件 (按进出方向)
            for event in output.zone_events() {
                let kind = match event.kind {
                    ZoneEventKind::Entry => "entry",
                    ZoneEventKind::Exit => "exit",
                };
                counter!("sensr_watch_zone_events_total", "kind" => kind).increment(1);
            }

            // 跟踪丢失事件
            let losing = output.losing_events().len();
            if losing > 0 {
                counter!("sensr_watch_losing_events_total").increment(losing as u64);
            }

            // 健康报告
            if let Some(health) = output.health() {
                counter!("sensr_watch_health_reports_total").increment(1);
                gauge!("sensr_watch_unhealthy_components")
                    .set(unhealthy_components(health) as f64);
            }
        }
        StreamMessage::PointResult(result) => {
            // 单帧点数与点云数
            histogram!("sensr_watch_points_per_result").record(result.total_points() as f64);
            gauge!("sensr_watch_point_clouds").set(result.clouds.len() as f64);
        }
    }
}

/// 记录故障通知
pub fn record_fault(kind: &str) {
    counter!(
        "sensr_watch_faults_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// 记录事件分发
pub fn record_event_dispatched(category: &str) {
    counter!(
        "sensr_watch_events_dispatched_total",
        "category" => category.to_string()
    )
    .increment(1);
}

/// 记录 feed 通道深度
pub fn record_feed_depth(depth: usize) {
    gauge!("sensr_watch_feed_depth").set(depth as f64);
}

/// 记录单个 listener 的队列深度
pub fn record_listener_queue_depth(listener: &str, depth: usize) {
    gauge!(
        "sensr_watch_listener_queue_depth",
        "listener" => listener.to_string()
    )
    .set(depth as f64);
}

/// 统计健康报告中非 Good 的组件数
fn unhealthy_components(health: &SystemHealth) -> usize {
    let mut count = usize::from(!health.master.is_good());
    for node in health.nodes.values() {
        if !node.status.is_good() {
            count += 1;
        }
        count += node.sensors.values().filter(|s| !s.is_good()).count();
    }
    count
}

/// 流统计聚合器
///
/// 在内存中聚合消息统计，便于会话结束时输出摘要。
#[derive(Debug, Clone, Default)]
pub struct StreamStatsAggregator {
    /// 总消息数
    pub total_messages: u64,

    /// 输出消息数
    pub output_messages: u64,

    /// 点云结果数
    pub point_results: u64,

    /// 故障总数
    pub total_faults: u64,

    /// 区域进入事件数
    pub zone_entries: u64,

    /// 区域离开事件数
    pub zone_exits: u64,

    /// 跟踪丢失事件数
    pub losing_events: u64,

    /// 健康报告数
    pub health_reports: u64,

    /// 含非 Good 组件的健康报告数
    pub unhealthy_reports: u64,

    /// 每条输出消息的目标数统计
    pub objects_stats: CumulativeStats,

    /// 每帧点数统计
    pub points_stats: CumulativeStats,

    /// 各故障种类的计数
    pub fault_counts: HashMap<String, u64>,

    /// 首条消息时间戳
    pub first_timestamp: Option<f64>,

    /// 末条消息时间戳
    pub last_timestamp: Option<f64>,
}

impl StreamStatsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, message: &StreamMessage) {
        self.total_messages += 1;

        let timestamp = message.timestamp();
        if self.first_timestamp.is_none() {
            self.first_timestamp = Some(timestamp);
        }
        self.last_timestamp = Some(timestamp);

        match message {
            StreamMessage::Output(output) => {
                self.output_messages += 1;
                self.objects_stats.push(output.object_count() as f64);

                for event in output.zone_events() {
                    match event.kind {
                        ZoneEventKind::Entry => self.zone_entries += 1,
                        ZoneEventKind::Exit => self.zone_exits += 1,
                    }
                }
                self.losing_events += output.losing_events().len() as u64;

                if let Some(health) = output.health() {
                    self.health_reports += 1;
                    if unhealthy_components(health) > 0 {
                        self.unhealthy_reports += 1;
                    }
                }
            }
            StreamMessage::PointResult(result) => {
                self.point_results += 1;
                self.points_stats.push(result.total_points() as f64);
            }
        }
    }

    /// 记录故障
    pub fn record_fault(&mut self, kind: &str) {
        self.total_faults += 1;
        *self.fault_counts.entry(kind.to_string()).or_insert(0) += 1;
    }

    /// 生成摘要报告
    pub fn summary(&self) -> StreamSummary {
        let duration_secs = match (self.first_timestamp, self.last_timestamp) {
            (Some(first), Some(last)) if last > first => last - first,
            _ => 0.0,
        };

        StreamSummary {
            total_messages: self.total_messages,
            output_messages: self.output_messages,
            point_results: self.point_results,
            total_faults: self.total_faults,
            zone_entries: self.zone_entries,
            zone_exits: self.zone_exits,
            losing_events: self.losing_events,
            health_reports: self.health_reports,
            unhealthy_reports: self.unhealthy_reports,
            duration_secs,
            message_rate_hz: if duration_secs > 0.0 {
                self.total_messages as f64 / duration_secs
            } else {
                0.0
            },
            objects_per_message: StatsSummary::from(&self.objects_stats),
            points_per_result: StatsSummary::from(&self.points_stats),
            fault_counts: self.fault_counts.clone(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 会话摘要
#[derive(Debug, Clone, Default)]
pub struct StreamSummary {
    pub total_messages: u64,
    pub output_messages: u64,
    pub point_results: u64,
    pub total_faults: u64,
    pub zone_entries: u64,
    pub zone_exits: u64,
    pub losing_events: u64,
    pub health_reports: u64,
    pub unhealthy_reports: u64,
    pub duration_secs: f64,
    pub message_rate_hz: f64,
    pub objects_per_message: StatsSummary,
    pub points_per_result: StatsSummary,
    pub fault_counts: HashMap<String, u64>,
}

impl std::fmt::Display for StreamSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Stream Summary ===")?;
        writeln!(
            f,
            "Messages: {} (output: {}, point results: {})",
            self.total_messages, self.output_messages, self.point_results
        )?;
        if self.duration_secs > 0.0 {
            writeln!(
                f,
                "Rate: {:.2} msg/s over {:.2}s",
                self.message_rate_hz, self.duration_secs
            )?;
        }
        writeln!(
            f,
            "Zone events: {} entries, {} exits",
            self.zone_entries, self.zone_exits
        )?;
        writeln!(f, "Losing events: {}", self.losing_events)?;
        writeln!(
            f,
            "Health reports: {} (unhealthy: {})",
            self.health_reports, self.unhealthy_reports
        )?;
        writeln!(f, "Objects/message: {}", self.objects_per_message)?;
        writeln!(f, "Points/result: {}", self.points_per_result)?;
        writeln!(f, "Faults: {}", self.total_faults)?;

        if !self.fault_counts.is_empty() {
            for (kind, count) in &self.fault_counts {
                writeln!(f, "  {}: {}", kind, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl From<&CumulativeStats> for StatsSummary {
    fn from(stats: &CumulativeStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.1} (n={})",
                self.min, self.max, self.mean, self.count
            )
        }
    }
}

/// 在线统计计算器 (累积均值)
#[derive(Debug, Clone, Default)]
pub struct CumulativeStats {
    count: u64,
    mean: f64,
    min: f64,
    max: f64,
}

impl CumulativeStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
            self.mean += (value - self.mean) / self.count as f64;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        EventRecord, HealthStatus, LosingEvent, ObjectStream, OutputMessage, PointResult,
        ZoneEvent,
    };
    use std::collections::BTreeMap;

    #[test]
    fn test_cumulative_stats() {
        let mut stats = CumulativeStats::default();

        stats.push(1.0);
        stats.push(2.0);
        stats.push(3.0);
        stats.push(4.0);
        stats.push(5.0);

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = StreamStatsAggregator::new();

        let message = StreamMessage::Output(OutputMessage {
            timestamp: 10.0,
            stream: Some(ObjectStream {
                objects: vec![],
                health: Some(SystemHealth {
                    master: HealthStatus::Degraded,
                    nodes: BTreeMap::new(),
                }),
            }),
            event: Some(EventRecord {
                zone: vec![
                    ZoneEvent {
                        kind: ZoneEventKind::Entry,
                        zone_id: 1,
                        object_id: 3,
                        timestamp: 10.0,
                    },
                    ZoneEvent {
                        kind: ZoneEventKind::Exit,
                        zone_id: 1,
                        object_id: 4,
                        timestamp: 10.0,
                    },
                ],
                losing: vec![LosingEvent {
                    object_id: 7,
                    timestamp: 10.0,
                }],
            }),
        });
        aggregator.update(&message);

        let points = StreamMessage::PointResult(PointResult {
            timestamp: 10.5,
            clouds: vec![],
        });
        aggregator.update(&points);

        assert_eq!(aggregator.total_messages, 2);
        assert_eq!(aggregator.output_messages, 1);
        assert_eq!(aggregator.point_results, 1);
        assert_eq!(aggregator.zone_entries, 1);
        assert_eq!(aggregator.zone_exits, 1);
        assert_eq!(aggregator.losing_events, 1);
        assert_eq!(aggregator.health_reports, 1);
        assert_eq!(aggregator.unhealthy_reports, 1);
        assert_eq!(aggregator.first_timestamp, Some(10.0));
        assert_eq!(aggregator.last_timestamp, Some(10.5));
    }

    #[test]
    fn test_fault_counts_by_kind() {
        let mut aggregator = StreamStatsAggregator::new();

        aggregator.record_fault("connection");
        aggregator.record_fault("decode");
        aggregator.record_fault("decode");

        assert_eq!(aggregator.total_faults, 3);
        assert_eq!(aggregator.fault_counts.get("connection"), Some(&1));
        assert_eq!(aggregator.fault_counts.get("decode"), Some(&2));
    }

    #[test]
    fn test_summary_rate() {
        let mut aggregator = StreamStatsAggregator::new();
        for i in 0..11 {
            aggregator.update(&StreamMessage::PointResult(PointResult {
                timestamp: 100.0 + i as f64 * 0.1,
                clouds: vec![],
            }));
        }

        let summary = aggregator.summary();
        assert_eq!(summary.total_messages, 11);
        assert!((summary.duration_secs - 1.0).abs() < 1e-9);
        assert!((summary.message_rate_hz - 11.0).abs() < 1e-6);
    }

    #[test]
    fn test_summary_display() {
        let summary = StreamSummary {
            total_messages: 100,
            output_messages: 60,
            point_results: 40,
            total_faults: 2,
            zone_entries: 5,
            zone_exits: 4,
            losing_events: 1,
            health_reports: 6,
            unhealthy_reports: 0,
            duration_secs: 10.0,
            message_rate_hz: 10.0,
            objects_per_message: StatsSummary {
                count: 60,
                min: 1.0,
                max: 5.0,
                mean: 3.0,
            },
            points_per_result: StatsSummary::default(),
            fault_counts: HashMap::from([("decode".to_string(), 2)]),
        };

        let output = format!("{}", summary);
        assert!(output.contains("Messages: 100"));
        assert!(output.contains("10.00 msg/s"));
        assert!(output.contains("decode: 2"));
        assert!(output.contains("N/A"));
    }
}
