// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

use crate::config::settings::MetricsSettings;
use crate::domain::models::dispatch_result::{DispatchResult, Outcome};

pub const ITEMS_TOTAL: &str = "dispatch_items_total";
pub const IN_FLIGHT: &str = "dispatch_in_flight";
pub const ITEM_DURATION: &str = "dispatch_item_duration_seconds";
pub const BATCHES_TOTAL: &str = "dispatch_batches_total";

/// 初始化指标系统
///
/// 启用时安装 Prometheus 导出器并注册调度指标。未安装导出器时，
/// 所有指标宏都是空操作。
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        return;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address '{}': {}", settings.listen_addr, e);
            return;
        }
    };

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!(
            "Failed to install Prometheus recorder: {}. This might happen if the port is already in use.",
            e
        );
        return;
    }

    describe_counter!(ITEMS_TOTAL, "Total number of work items dispatched, by outcome");
    describe_gauge!(IN_FLIGHT, "Number of operations currently in flight");
    describe_histogram!(ITEM_DURATION, "Duration of a single operation in seconds");
    describe_counter!(BATCHES_TOTAL, "Total number of batches started");

    info!("Metrics exporter listening on {}", addr);
}

/// 记录单个结果
pub fn record_result<T>(result: &DispatchResult<T>) {
    let outcome = match &result.outcome {
        Outcome::Success(_) => "success",
        Outcome::Failure(e) => e.kind(),
    };
    counter!(ITEMS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(ITEM_DURATION).record(result.elapsed.as_secs_f64());
}
