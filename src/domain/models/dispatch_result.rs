// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::work_item::WorkItem;
use crate::utils::errors::ItemError;
use std::time::Duration;

/// 单个工作项的执行结果
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// 成功，携带操作返回的数据
    Success(T),
    /// 失败，携带错误原因
    Failure(ItemError),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn error(&self) -> Option<&ItemError> {
        match self {
            Outcome::Failure(e) => Some(e),
            Outcome::Success(_) => None,
        }
    }
}

impl<T> From<Result<T, ItemError>> for Outcome<T> {
    fn from(result: Result<T, ItemError>) -> Self {
        match result {
            Ok(payload) => Outcome::Success(payload),
            Err(e) => Outcome::Failure(e),
        }
    }
}

/// 调度结果
///
/// 每个工作项恰好产生一个结果，创建后所有权转移给聚合步骤，不再修改。
#[derive(Debug, Clone)]
pub struct DispatchResult<T> {
    /// 对应的工作项
    pub item: WorkItem,
    /// 执行结果
    pub outcome: Outcome<T>,
    /// 执行耗时；未被执行的工作项为零
    pub elapsed: Duration,
}

impl<T> DispatchResult<T> {
    pub fn new(item: WorkItem, outcome: Outcome<T>, elapsed: Duration) -> Self {
        Self {
            item,
            outcome,
            elapsed,
        }
    }

    /// 为从未执行的工作项生成取消结果
    pub fn cancelled(item: WorkItem) -> Self {
        Self::new(item, Outcome::Failure(ItemError::Cancelled), Duration::ZERO)
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// 执行耗时（毫秒），超出 `u64` 范围时取最大值
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}
