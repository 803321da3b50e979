//! OutputMessage - 感知输出流
//!
//! 目标跟踪流、区域/丢失事件和系统健康状态。

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::points::POINT_STRIDE;

/// 感知输出消息
///
/// stream 部分携带目标快照 (和周期性的健康报告)，
/// event 部分携带区域进出和跟踪丢失事件。两部分均可缺省。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputMessage {
    /// 消息时间戳 (unix seconds, f64) - 主时钟
    pub timestamp: f64,

    /// 目标跟踪流
    #[serde(default)]
    pub stream: Option<ObjectStream>,

    /// 区域/丢失事件
    #[serde(default)]
    pub event: Option<EventRecord>,
}

/// 目标跟踪快照
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectStream {
    /// 当前跟踪的目标
    #[serde(default)]
    pub objects: Vec<TrackedObject>,

    /// 周期性健康报告 (多数消息缺省)
    #[serde(default)]
    pub health: Option<SystemHealth>,
}

/// 跟踪目标
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedObject {
    /// 跟踪 ID (目标持续被跟踪期间保持稳定)
    pub id: u32,

    /// 分类标签
    pub label: ObjectLabel,

    /// 跟踪生命周期状态
    pub tracking_status: TrackingStatus,

    /// 轴对齐包围盒
    pub bbox: BoundingBox,

    /// 速度 (m/s)
    #[serde(default)]
    pub velocity: Vector3,

    /// 目标当前所在的区域
    #[serde(default)]
    pub zone_ids: Vec<u32>,

    /// 目标点云 (packed x,y,z f32)
    #[serde(default)]
    pub points: Bytes,

    /// 每点反射强度 (packed f32)
    #[serde(default)]
    pub intensities: Bytes,
}

impl TrackedObject {
    /// 归属于该目标的点数
    pub fn num_points(&self) -> usize {
        self.points.len() / POINT_STRIDE
    }
}

/// 目标分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectLabel {
    Pedestrian,
    Car,
    Cyclist,
    Misc,
}

/// 跟踪生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    /// 新建轨迹，尚未确认
    Init,
    /// 已确认，正在跟踪
    Tracking,
    /// 量测丢失，仅靠预测维持
    Lost,
}

/// 轴对齐包围盒
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// 中心位置 (m)
    pub position: Vector3,

    /// 各轴尺寸 (m)
    pub size: Vector3,
}

/// 3D 向量
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// 单条消息携带的区域/丢失事件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventRecord {
    /// 区域进入/离开事件
    #[serde(default)]
    pub zone: Vec<ZoneEvent>,

    /// 自上条消息以来丢失的轨迹
    #[serde(default)]
    pub losing: Vec<LosingEvent>,
}

/// 区域事件
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneEvent {
    /// 进入或离开
    pub kind: ZoneEventKind,

    /// 事件发生的区域
    pub zone_id: u32,

    /// 发生事件的目标
    pub object_id: u32,

    /// 事件时间戳 (unix seconds)
    pub timestamp: f64,
}

/// 区域事件方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneEventKind {
    Entry,
    Exit,
}

/// 跟踪丢失事件
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LosingEvent {
    /// 轨迹被丢弃的目标
    pub object_id: u32,

    /// 丢失时间戳 (unix seconds)
    pub timestamp: f64,
}

/// 系统健康报告
///
/// 对应 SENSR 拓扑：一个 master，其下算法节点，节点下挂传感器。
/// BTreeMap 保证报告顺序稳定。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemHealth {
    /// master 进程状态
    pub master: HealthStatus,

    /// 各节点状态，以节点地址为键
    #[serde(default)]
    pub nodes: BTreeMap<String, NodeHealth>,
}

/// 单个算法节点的健康状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeHealth {
    /// 节点进程状态
    pub status: HealthStatus,

    /// 各传感器状态，以传感器序列号为键
    #[serde(default)]
    pub sensors: BTreeMap<String, HealthStatus>,
}

/// 单个组件的健康状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Good,
    Degraded,
    Bad,
}

impl HealthStatus {
    pub fn is_good(&self) -> bool {
        matches!(self, HealthStatus::Good)
    }
}

impl OutputMessage {
    /// 消息中跟踪目标的数量
    pub fn object_count(&self) -> usize {
        self.stream.as_ref().map_or(0, |s| s.objects.len())
    }

    /// 消息携带的健康报告 (如有)
    pub fn health(&self) -> Option<&SystemHealth> {
        self.stream.as_ref().and_then(|s| s.health.as_ref())
    }

    /// 消息携带的区域事件 (无则为空)
    pub fn zone_events(&self) -> &[ZoneEvent] {
        self.event.as_ref().map_or(&[], |e| e.zone.as_slice())
    }

    /// 消息携带的丢失事件 (无则为空)
    pub fn losing_events(&self) -> &[LosingEvent] {
        self.event.as_ref().map_or(&[], |e| e.losing.as_slice())
    }
}
