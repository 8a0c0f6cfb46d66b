// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::TelemetrySettings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,dispatchrs=debug";

/// 初始化日志系统
///
/// 优先使用 `RUST_LOG` 环境变量，否则回退到默认过滤规则。
/// 重复初始化（例如在测试中）会被忽略。
pub fn init_telemetry(settings: &TelemetrySettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| settings.filter.as_deref().unwrap_or(DEFAULT_FILTER).into());

    let registry = tracing_subscriber::registry().with(filter);

    let result = if settings.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    if let Err(e) = result {
        tracing::debug!("Telemetry already initialized: {}", e);
    }
}

#[cfg(test)]
#[path = "telemetry_test.rs"]
mod tests;
