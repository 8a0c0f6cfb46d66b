// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 工作项
///
/// 调度的最小单元，通常是一个待抓取的 URL。入队后不可变。
/// `id` 由工作源按生产顺序分配，是结果与工作项对应的唯一依据；
/// 相同 `target` 的重复工作项拥有不同的 `id`，彼此独立。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkItem {
    /// 工作项序号
    pub id: usize,
    /// 目标标识（URL）
    pub target: String,
}

impl WorkItem {
    /// 创建新的工作项
    pub fn new(id: usize, target: impl Into<String>) -> Self {
        Self {
            id,
            target: target.into(),
        }
    }

    /// 按顺序为目标列表分配序号
    pub fn from_targets<I, S>(targets: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        targets
            .into_iter()
            .enumerate()
            .map(|(id, target)| Self::new(id, target))
            .collect()
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.target)
    }
}
