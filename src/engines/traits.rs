// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::Serialize;
use std::future::Future;

use crate::domain::models::work_item::WorkItem;
use crate::utils::errors::ItemError;

/// 操作特质
///
/// 调度器与外部世界的唯一接口。每次调用恰好执行一个外部可见的动作
/// （例如一次出站请求），并把失败转换为 `ItemError` 而不是中止进程。
#[async_trait]
pub trait Operation: Send + Sync + 'static {
    /// 成功时返回的数据
    type Output: Send + 'static;

    /// 对单个工作项执行操作
    async fn execute(&self, item: &WorkItem) -> Result<Self::Output, ItemError>;

    /// 操作名称
    fn name(&self) -> &'static str {
        "operation"
    }
}

/// 闭包操作
///
/// 把 `Fn(WorkItem) -> Future` 闭包适配为 [`Operation`]
pub struct FnOperation<F> {
    f: F,
}

impl<F> FnOperation<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut, T> Operation for FnOperation<F>
where
    F: Fn(WorkItem) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ItemError>> + Send + 'static,
    T: Send + 'static,
{
    type Output = T;

    async fn execute(&self, item: &WorkItem) -> Result<T, ItemError> {
        (self.f)(item.clone()).await
    }

    fn name(&self) -> &'static str {
        "fn"
    }
}

/// 便捷构造函数
pub fn from_fn<F, Fut, T>(f: F) -> FnOperation<F>
where
    F: Fn(WorkItem) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ItemError>> + Send + 'static,
    T: Send + 'static,
{
    FnOperation::new(f)
}

/// 抓取响应
#[derive(Debug, Clone, Serialize)]
pub struct FetchResponse {
    /// HTTP状态码
    pub status_code: u16,
    /// 内容类型
    pub content_type: String,
    /// 响应正文字节数
    pub content_length: usize,
    /// 响应正文，仅在配置保留时存在
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// 响应时间（毫秒）
    pub response_time_ms: u64,
}
