// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::models::dispatch_result::{DispatchResult, Outcome};

/// 批次状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// 执行中
    Running,
    /// 所有工作项都已产生结果
    Complete,
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BatchStatus::Running => write!(f, "running"),
            BatchStatus::Complete => write!(f, "complete"),
        }
    }
}

/// 批次
///
/// 调度器对一个有限工作项序列的一次完整执行。
/// 多个批次可以顺序执行，但不会并发执行。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    /// 批次唯一标识符
    pub id: Uuid,
    /// 工作项数量；惰性工作源在完成前为 0
    pub size: usize,
    /// 并发上限
    pub concurrency: usize,
    /// 当前状态
    pub status: BatchStatus,
    /// 开始时间
    pub started_at: DateTime<Utc>,
    /// 完成时间
    pub finished_at: Option<DateTime<Utc>>,
}

impl Batch {
    /// 创建一个处于运行状态的新批次
    pub fn start(size: usize, concurrency: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            size,
            concurrency,
            status: BatchStatus::Running,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// 将批次标记为完成
    pub fn complete(&mut self, size: usize) {
        self.size = size;
        self.status = BatchStatus::Complete;
        self.finished_at = Some(Utc::now());
    }
}

/// 批次报告
///
/// 按完成顺序保存的全部结果，以及批次元数据
#[derive(Debug, Clone)]
pub struct BatchReport<T> {
    pub batch: Batch,
    pub results: Vec<DispatchResult<T>>,
    /// 批次是否因取消或截止时间而提前结束
    pub cancelled: bool,
}

impl<T> BatchReport<T> {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    /// 以 `Failure(Cancelled)` 结束的工作项数量
    pub fn cancelled_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(&r.outcome, Outcome::Failure(e) if e.is_cancelled()))
            .count()
    }

    /// 按工作项序号查找结果
    pub fn find(&self, id: usize) -> Option<&DispatchResult<T>> {
        self.results.iter().find(|r| r.item.id == id)
    }

    pub fn into_results(self) -> Vec<DispatchResult<T>> {
        self.results
    }
}
