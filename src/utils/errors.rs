// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;
use thiserror::Error;

/// 单个工作项的错误类型
///
/// 这些错误只影响对应的工作项，会被记录为 `Failure` 结果，批次继续执行
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    /// 请求失败（连接、DNS、TLS 等传输层错误）
    #[error("Request failed: {0}")]
    Request(String),

    /// 非 2xx 状态码
    #[error("Unexpected status: {0}")]
    Status(u16),

    /// 单项超时
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// 批次被取消或截止时间到达
    #[error("Cancelled")]
    Cancelled,

    /// 操作内部 panic
    #[error("Operation panicked: {0}")]
    Panicked(String),

    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl ItemError {
    /// 用于日志和指标的简短标签
    pub fn kind(&self) -> &'static str {
        match self {
            ItemError::Request(_) => "request",
            ItemError::Status(_) => "status",
            ItemError::Timeout(_) => "timeout",
            ItemError::Cancelled => "cancelled",
            ItemError::Panicked(_) => "panicked",
            ItemError::Other(_) => "other",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ItemError::Cancelled)
    }
}

impl From<reqwest::Error> for ItemError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return ItemError::Status(status.as_u16());
        }
        ItemError::Request(err.to_string())
    }
}

/// 调度器错误类型
///
/// 在任何工作器启动之前返回，对整个 `run` 调用是致命的
#[derive(Error, Debug)]
pub enum DispatchError {
    /// 无效的调度配置（例如并发数小于 1）
    #[error("配置错误: {0}")]
    Config(String),

    /// 工作源格式错误
    #[error("无效的工作源: {0}")]
    InvalidSource(String),

    /// 配置加载失败
    #[error("配置加载失败: {0}")]
    Settings(#[from] config::ConfigError),

    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}
