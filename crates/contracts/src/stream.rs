//! 流消息封装 - 数据源与 dispatcher 共享

use serde::{Deserialize, Serialize};

use crate::{ListeningType, OutputMessage, PointResult, StreamError};

/// 可订阅的单条消息。
///
/// tag 同时作为 JSONL 录制格式的记录判别符，
/// 回放时可据此重建完全一致的类别序列。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreamMessage {
    /// 感知输出消息
    Output(OutputMessage),

    /// 点云结果
    PointResult(PointResult),
}

impl StreamMessage {
    /// 消息所属的订阅类别
    pub fn category(&self) -> ListeningType {
        match self {
            StreamMessage::Output(_) => ListeningType::OUTPUT_MESSAGE,
            StreamMessage::PointResult(_) => ListeningType::POINT_RESULT,
        }
    }

    /// 类别标签 (用于日志字段和 metric tag)
    pub fn category_label(&self) -> &'static str {
        match self {
            StreamMessage::Output(_) => "output_message",
            StreamMessage::PointResult(_) => "point_result",
        }
    }

    /// 消息时间戳 (unix seconds)
    pub fn timestamp(&self) -> f64 {
        match self {
            StreamMessage::Output(message) => message.timestamp,
            StreamMessage::PointResult(result) => result.timestamp,
        }
    }
}

/// `MessageSource` 向 feed 通道发出的事件
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// 可订阅消息，按监听掩码分发
    Message(StreamMessage),

    /// 故障，广播给所有监听器
    Fault(StreamError),
}

impl FeedEvent {
    /// 日志字段用的事件标签
    pub fn label(&self) -> &'static str {
        match self {
            FeedEvent::Message(message) => message.category_label(),
            FeedEvent::Fault(_) => "fault",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_matches_variant() {
        let output = StreamMessage::Output(OutputMessage {
            timestamp: 1.0,
            stream: None,
            event: None,
        });
        assert_eq!(output.category(), ListeningType::OUTPUT_MESSAGE);
        assert_eq!(output.category_label(), "output_message");

        let points = StreamMessage::PointResult(PointResult {
            timestamp: 2.0,
            clouds: vec![],
        });
        assert_eq!(points.category(), ListeningType::POINT_RESULT);
        assert_eq!(points.category_label(), "point_result");
    }

    #[test]
    fn record_tag_is_stable() {
        let output = StreamMessage::Output(OutputMessage {
            timestamp: 1.5,
            stream: None,
            event: None,
        });
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"kind\":\"output\""));

        let back: StreamMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.timestamp(), 1.5);
    }
}
