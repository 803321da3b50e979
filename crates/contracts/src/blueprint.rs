//! ClientBlueprint - Config Loader 输出
//!
//! 描述完整的客户端会话：喂给流的数据源和消费流的监听器。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ListeningType;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的客户端会话蓝图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 共享 feed 通道设置
    #[serde(default)]
    pub feed: FeedSettings,

    /// 数据源列表
    pub sources: Vec<SourceConfig>,

    /// 监听器注册列表；可为空，消息将只被计数
    #[serde(default)]
    pub listeners: Vec<ListenerConfig>,
}

/// Feed 通道设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSettings {
    /// 有界 feed 通道容量
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// 通道满时的丢弃策略
    #[serde(default)]
    pub drop_policy: DropPolicy,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            drop_policy: DropPolicy::default(),
        }
    }
}

fn default_channel_capacity() -> usize {
    100
}

/// 有界通道满时的丢弃策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// 丢弃新到的事件
    #[default]
    DropNewest,
    /// 挤掉队列中最旧的事件，保留新到的
    DropOldest,
}

/// 数据源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// 唯一标识
    pub id: String,

    /// 数据源类型
    pub kind: SourceKind,

    /// 发送频率 (Hz)，仅 mock 源；必须 > 0
    #[serde(default = "default_frequency_hz")]
    pub frequency_hz: f64,

    /// 发出的消息类别，仅 mock 源
    #[serde(default = "ListeningType::all")]
    pub emit: ListeningType,

    /// 类型相关参数
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_frequency_hz() -> f64 {
    10.0
}

/// 数据源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// 合成流生成器
    Mock,
    /// JSONL 录制回放；需要参数 `path`
    Replay,
}

/// 监听器注册
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerConfig {
    /// 监听器名称，会话内唯一
    pub name: String,

    /// 监听器类型
    pub kind: ListenerKind,

    /// 掩码覆盖，仅对掩码可配置的类型生效
    #[serde(default)]
    pub subscribe: Option<ListeningType>,

    /// 单监听器投递队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// 类型相关参数
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    100
}

/// 监听器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerKind {
    /// 每条消息的结构化日志摘要
    Log,
    /// 健康报告巡检
    Health,
    /// 点云统计
    PointStats,
    /// JSONL 会话录制；需要参数 `dir`
    Recording,
}

impl ListenerKind {
    /// 该类型在无覆盖时订阅的掩码
    pub fn default_subscription(&self) -> ListeningType {
        match self {
            ListenerKind::Log | ListenerKind::Recording => ListeningType::all(),
            ListenerKind::Health => ListeningType::OUTPUT_MESSAGE,
            ListenerKind::PointStats => ListeningType::POINT_RESULT,
        }
    }

    /// 该类型是否接受 `subscribe` 覆盖。
    ///
    /// Health 和 PointStats 只对单一类别有意义，掩码固定。
    pub fn mask_overridable(&self) -> bool {
        matches!(self, ListenerKind::Log | ListenerKind::Recording)
    }
}

impl ListenerConfig {
    /// 构造出的监听器将上报的掩码
    pub fn effective_subscription(&self) -> ListeningType {
        match (self.kind.mask_overridable(), self.subscribe) {
            (true, Some(mask)) => mask,
            _ => self.kind.default_subscription(),
        }
    }
}
