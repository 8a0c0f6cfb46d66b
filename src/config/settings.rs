// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// 应用程序配置设置
///
/// 包含调度器、HTTP 客户端、日志和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 调度器配置
    pub dispatcher: DispatcherSettings,
    /// HTTP 引擎配置
    pub http: HttpSettings,
    /// 日志配置
    pub telemetry: TelemetrySettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 调度器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DispatcherSettings {
    /// 并发上限 N
    pub concurrency: usize,
    /// 调度模式 (pool, paced)
    pub mode: String,
    /// 分块之间的间隔（毫秒），仅 paced 模式使用
    pub pacing_ms: Option<u64>,
    /// 单项超时（毫秒）
    pub item_timeout_ms: Option<u64>,
    /// 整个批次的截止时间（毫秒）
    pub deadline_ms: Option<u64>,
}

/// HTTP 引擎配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    /// User-Agent
    pub user_agent: String,
    /// 请求超时（毫秒）
    pub timeout_ms: u64,
    /// 是否保留响应正文
    pub keep_body: bool,
}

/// 日志配置设置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelemetrySettings {
    /// 是否输出 JSON 格式日志
    pub json: bool,
    /// 默认过滤规则，`RUST_LOG` 优先
    pub filter: Option<String>,
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和
    /// `DISPATCHRS__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("DISPATCHRS").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 在默认值之上加载指定的配置文件
    ///
    /// 环境变量仍然优先于文件
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from(path.as_ref()).required(true))
            .add_source(Environment::with_prefix("DISPATCHRS").separator("__"))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            // Default dispatcher settings
            .set_default("dispatcher.concurrency", 10)?
            .set_default("dispatcher.mode", "pool")?
            // Default HTTP settings
            .set_default("http.user_agent", "Mozilla/5.0 (compatible; dispatchrs/0.1)")?
            .set_default("http.timeout_ms", 30_000)?
            .set_default("http.keep_body", false)?
            // Default telemetry settings
            .set_default("telemetry.json", false)?
            // Default metrics settings
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
