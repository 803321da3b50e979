//! 数据源工厂
//!
//! 从 SourceConfig 构建具体的 `MessageSource` 实例。

use std::path::Path;
use std::str::FromStr;

use contracts::{MessageSource, SourceConfig, SourceKind, StreamError};
use tracing::debug;

use crate::error::{FeedError, Result};
use crate::mock::{MockFeed, MockFeedConfig, ScriptedFault};
use crate::replay::{ReplayConfig, ReplayFeed};

/// 从配置构建数据源
pub fn build_source(config: &SourceConfig) -> Result<Box<dyn MessageSource>> {
    debug!(source_id = %config.id, kind = ?config.kind, "building source");

    match config.kind {
        SourceKind::Mock => build_mock(config),
        SourceKind::Replay => build_replay(config),
    }
}

/// 解析可选参数，解析失败返回 InvalidParam
fn parse_param<T: FromStr>(config: &SourceConfig, key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match config.params.get(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| FeedError::invalid_param(&config.id, key, e.to_string())),
    }
}

/// 构建 Mock 源
///
/// 可选参数：`objects_per_message`、`points_per_cloud`、`zone_ids`
/// (逗号分隔)、`health_every`、`fault_after`/`fault_kind`/`fault_reason`。
fn build_mock(config: &SourceConfig) -> Result<Box<dyn MessageSource>> {
    let defaults = MockFeedConfig::default();

    let zone_ids = match config.params.get("zone_ids") {
        None => defaults.zone_ids,
        Some(raw) => raw
            .split(',')
            .map(|part| part.trim().parse::<u32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| FeedError::invalid_param(&config.id, "zone_ids", e.to_string()))?,
    };

    let faults = match parse_param::<u64>(config, "fault_after")? {
        None => Vec::new(),
        Some(after_message) => {
            let reason = config
                .params
                .get("fault_reason")
                .cloned()
                .unwrap_or_else(|| "scripted fault".to_string());
            let error = match config.params.get("fault_kind").map(String::as_str) {
                None | Some("connection") => StreamError::connection(reason),
                Some("decode") => StreamError::decode(reason),
                Some("internal") => StreamError::internal(reason),
                Some(other) => {
                    return Err(FeedError::invalid_param(
                        &config.id,
                        "fault_kind",
                        format!("unknown fault kind '{other}'"),
                    ))
                }
            };
            vec![ScriptedFault {
                after_message,
                error,
            }]
        }
    };

    let mock_config = MockFeedConfig {
        frequency_hz: config.frequency_hz,
        emit: config.emit,
        objects_per_message: parse_param(config, "objects_per_message")?
            .unwrap_or(defaults.objects_per_message),
        points_per_cloud: parse_param(config, "points_per_cloud")?
            .unwrap_or(defaults.points_per_cloud),
        zone_ids,
        health_every: parse_param(config, "health_every")?.unwrap_or(defaults.health_every),
        faults,
    };

    Ok(Box::new(MockFeed::new(config.id.clone(), mock_config)))
}

/// 构建 Replay 源
///
/// 必需参数：`path`。可选参数：`speed`、`loop`。
fn build_replay(config: &SourceConfig) -> Result<Box<dyn MessageSource>> {
    let path = config
        .params
        .get("path")
        .ok_or_else(|| FeedError::missing_param(&config.id, "path"))?;

    let replay_config = ReplayConfig {
        speed: parse_param(config, "speed")?.unwrap_or(1.0),
        loop_playback: parse_param(config, "loop")?.unwrap_or(false),
    };

    let feed = ReplayFeed::load(Path::new(path), config.id.clone(), replay_config)?;
    Ok(Box::new(feed))
}
