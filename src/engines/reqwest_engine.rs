// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::settings::HttpSettings;
use crate::domain::models::work_item::WorkItem;
use crate::engines::traits::{FetchResponse, Operation};
use crate::utils::errors::ItemError;

/// 抓取引擎
///
/// 基于reqwest实现的 HTTP GET 操作，每个工作项发出一次请求。
/// 所有工作器共享同一个连接池。
#[derive(Debug, Clone)]
pub struct ReqwestEngine {
    client: reqwest::Client,
    keep_body: bool,
}

impl ReqwestEngine {
    /// 根据配置创建引擎
    ///
    /// # 返回值
    ///
    /// * `Ok(ReqwestEngine)` - 创建成功
    /// * `Err(reqwest::Error)` - 客户端构建失败（例如 TLS 后端初始化失败）
    pub fn new(settings: &HttpSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            keep_body: settings.keep_body,
        })
    }

    /// 使用已有客户端创建引擎
    pub fn with_client(client: reqwest::Client, keep_body: bool) -> Self {
        Self { client, keep_body }
    }
}

#[async_trait]
impl Operation for ReqwestEngine {
    type Output = FetchResponse;

    /// 执行HTTP抓取
    ///
    /// 非 2xx 响应记为 `ItemError::Status`，传输错误记为 `ItemError::Request`
    async fn execute(&self, item: &WorkItem) -> Result<FetchResponse, ItemError> {
        let start = Instant::now();
        let response = self.client.get(&item.target).send().await?;

        let status = response.status();
        if !status.is_success() {
            debug!(item_id = item.id, status = status.as_u16(), "Non-success status");
            return Err(ItemError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty())
            .unwrap_or("text/html")
            .to_string();

        let content = response.text().await?;

        Ok(FetchResponse {
            status_code: status.as_u16(),
            content_type,
            content_length: content.len(),
            body: self.keep_body.then_some(content),
            response_time_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
