// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::config::settings::DispatcherSettings;
use crate::utils::errors::DispatchError;

/// 调度模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// 常驻工作池：N 个工作器从共享队列中拉取工作项
    #[default]
    Pool,
    /// 分块节流：每次并发执行 N 个，全部完成后等待间隔再执行下一块
    Paced,
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DispatchMode::Pool => write!(f, "pool"),
            DispatchMode::Paced => write!(f, "paced"),
        }
    }
}

impl FromStr for DispatchMode {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pool" => Ok(DispatchMode::Pool),
            "paced" | "batched" => Ok(DispatchMode::Paced),
            other => Err(DispatchError::Config(format!(
                "unknown dispatch mode '{}'",
                other
            ))),
        }
    }
}

/// 调度配置
///
/// 在调度开始时显式传入，运行期间不变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// 并发上限 N，必须 >= 1
    pub concurrency: usize,
    /// 调度模式
    pub mode: DispatchMode,
    /// 分块之间的间隔，仅 paced 模式使用
    pub pacing: Option<Duration>,
    /// 单项超时
    pub item_timeout: Option<Duration>,
    /// 整个批次的截止时间
    pub deadline: Option<Duration>,
}

impl DispatchConfig {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency,
            mode: DispatchMode::Pool,
            pacing: None,
            item_timeout: None,
            deadline: None,
        }
    }

    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = Some(pacing);
        self
    }

    pub fn with_item_timeout(mut self, timeout: Duration) -> Self {
        self.item_timeout = Some(timeout);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// 校验配置
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 配置有效
    /// * `Err(DispatchError::Config)` - 并发数小于 1 或超时为零
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.concurrency < 1 {
            return Err(DispatchError::Config(format!(
                "concurrency must be at least 1, got {}",
                self.concurrency
            )));
        }
        if self.item_timeout == Some(Duration::ZERO) {
            return Err(DispatchError::Config(
                "item timeout must be greater than zero".to_string(),
            ));
        }
        if self.deadline == Some(Duration::ZERO) {
            return Err(DispatchError::Config(
                "deadline must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self::new(10)
    }
}

impl TryFrom<&DispatcherSettings> for DispatchConfig {
    type Error = DispatchError;

    fn try_from(settings: &DispatcherSettings) -> Result<Self, Self::Error> {
        let config = Self {
            concurrency: settings.concurrency,
            mode: settings.mode.parse()?,
            pacing: settings.pacing_ms.map(Duration::from_millis),
            item_timeout: settings.item_timeout_ms.map(Duration::from_millis),
            deadline: settings.deadline_ms.map(Duration::from_millis),
        };
        config.validate()?;
        Ok(config)
    }
}
