//! 配置校验模块
//!
//! 校验规则：
//! - 至少一个数据源
//! - source id 唯一且非空
//! - mock 源 frequency_hz > 0
//! - replay 源必须带 `path` 参数
//! - 监听器名称唯一且非空
//! - 队列/通道容量 > 0
//! - recording 监听器必须带 `dir` 参数

use std::collections::HashSet;

use contracts::{ClientBlueprint, ContractError, ListenerKind, SourceKind};

/// 校验 ClientBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &ClientBlueprint) -> Result<(), ContractError> {
    validate_feed(blueprint)?;
    validate_sources(blueprint)?;
    validate_listeners(blueprint)?;
    Ok(())
}

/// 校验 feed 通道设置
fn validate_feed(blueprint: &ClientBlueprint) -> Result<(), ContractError> {
    if blueprint.feed.channel_capacity == 0 {
        return Err(ContractError::config_validation(
            "feed.channel_capacity",
            "channel_capacity must be > 0",
        ));
    }
    Ok(())
}

/// 校验数据源列表：非空、id 唯一、按类型检查参数
fn validate_sources(blueprint: &ClientBlueprint) -> Result<(), ContractError> {
    if blueprint.sources.is_empty() {
        return Err(ContractError::config_validation(
            "sources",
            "at least one source is required",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, source) in blueprint.sources.iter().enumerate() {
        if source.id.is_empty() {
            return Err(ContractError::config_validation(
                format!("sources[{idx}].id"),
                "source id cannot be empty",
            ));
        }
        if !seen.insert(&source.id) {
            return Err(ContractError::config_validation(
                format!("sources[id={}]", source.id),
                "duplicate source id",
            ));
        }

        match source.kind {
            SourceKind::Mock => {
                if source.frequency_hz <= 0.0 {
                    return Err(ContractError::config_validation(
                        format!("sources[{}].frequency_hz", source.id),
                        format!("frequency_hz must be > 0, got {}", source.frequency_hz),
                    ));
                }
            }
            SourceKind::Replay => {
                if !source.params.contains_key("path") {
                    return Err(ContractError::config_validation(
                        format!("sources[{}].params.path", source.id),
                        "replay source requires a 'path' param",
                    ));
                }
            }
        }
    }
    Ok(())
}

/// 校验监听器列表：名称唯一、容量、按类型检查参数
fn validate_listeners(blueprint: &ClientBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, listener) in blueprint.listeners.iter().enumerate() {
        if listener.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("listeners[{idx}].name"),
                "listener name cannot be empty",
            ));
        }
        if !seen.insert(&listener.name) {
            return Err(ContractError::config_validation(
                format!("listeners[name={}]", listener.name),
                "duplicate listener name",
            ));
        }
        if listener.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("listeners[{}].queue_capacity", listener.name),
                "queue_capacity must be > 0",
            ));
        }
        if listener.kind == ListenerKind::Recording && !listener.params.contains_key("dir") {
            return Err(ContractError::config_validation(
                format!("listeners[{}].params.dir", listener.name),
                "recording listener requires a 'dir' param",
            ));
        }
    }
    Ok(())
}
