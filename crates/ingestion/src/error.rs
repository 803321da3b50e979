//! Ingestion 错误类型

use std::path::PathBuf;

use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum FeedError {
    /// 数据源缺少必需参数
    #[error("source '{source_id}' is missing required param '{param}'")]
    MissingParam {
        /// 数据源 ID
        source_id: String,
        /// 参数名
        param: String,
    },

    /// 数据源参数非法
    #[error("invalid param '{param}' for source '{source_id}': {message}")]
    InvalidParam {
        /// 数据源 ID
        source_id: String,
        /// 参数名
        param: String,
        /// 错误消息
        message: String,
    },

    /// 回放录制文件打开失败
    #[error("failed to open recording '{}'", .path.display())]
    ReplayOpen {
        /// 录制文件路径
        path: PathBuf,
        /// 底层 IO 错误
        #[source]
        source: std::io::Error,
    },

    /// IO 错误
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FeedError {
    /// 创建缺少参数错误
    pub fn missing_param(source_id: impl Into<String>, param: impl Into<String>) -> Self {
        Self::MissingParam {
            source_id: source_id.into(),
            param: param.into(),
        }
    }

    /// 创建参数非法错误
    pub fn invalid_param(
        source_id: impl Into<String>,
        param: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParam {
            source_id: source_id.into(),
            param: param.into(),
            message: message.into(),
        }
    }
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, FeedError>;
