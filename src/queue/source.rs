// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::domain::models::work_item::WorkItem;
use crate::utils::errors::DispatchError;

/// 工作项流
///
/// 必须是有限序列，调度器依赖“没有更多工作”来结束批次
pub type WorkStream = Box<dyn Iterator<Item = WorkItem> + Send>;

/// 工作源特质
///
/// 为一个批次提供有序的工作项序列。每次调用 `produce` 都从头开始产生
/// 一个新的序列，除读取底层列表或文件外没有副作用。
pub trait WorkSource: Send + Sync {
    /// 产生工作项序列
    fn produce(&self) -> Result<WorkStream, DispatchError>;

    /// 已知的工作项数量；惰性工作源返回 `None`
    fn size_hint(&self) -> Option<usize> {
        None
    }
}

/// 静态工作源
///
/// 预先已知的目标列表
#[derive(Debug, Clone)]
pub struct StaticSource {
    targets: Arc<[String]>,
}

impl StaticSource {
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
        }
    }
}

impl WorkSource for StaticSource {
    fn produce(&self) -> Result<WorkStream, DispatchError> {
        let targets = self.targets.clone();
        Ok(Box::new(
            (0..targets.len()).map(move |id| WorkItem::new(id, targets[id].clone())),
        ))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.targets.len())
    }
}

/// 重复工作源
///
/// 将同一个目标重复 `count` 次，用于压测同一个地址
#[derive(Debug, Clone)]
pub struct RepeatSource {
    target: String,
    count: usize,
}

impl RepeatSource {
    pub fn new(target: impl Into<String>, count: usize) -> Self {
        Self {
            target: target.into(),
            count,
        }
    }
}

impl WorkSource for RepeatSource {
    fn produce(&self) -> Result<WorkStream, DispatchError> {
        let target = self.target.clone();
        Ok(Box::new(
            (0..self.count).map(move |id| WorkItem::new(id, target.clone())),
        ))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.count)
    }
}

/// 行文件工作源
///
/// 每行一个 URL。空行和以 `#` 开头的行会被跳过，
/// 其他不是 http(s) 绝对地址的行会使 `produce` 失败。
#[derive(Debug, Clone)]
pub struct LineFileSource {
    path: PathBuf,
}

impl LineFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 读取并校验全部行
    fn load(&self) -> Result<Vec<String>, DispatchError> {
        let content = fs::read_to_string(&self.path)?;
        let mut targets = Vec::new();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            validate_target(line).map_err(|reason| {
                DispatchError::InvalidSource(format!(
                    "{}:{}: {}",
                    self.path.display(),
                    line_no + 1,
                    reason
                ))
            })?;
            targets.push(line.to_string());
        }

        debug!(path = %self.path.display(), count = targets.len(), "Loaded work source file");
        Ok(targets)
    }
}

impl WorkSource for LineFileSource {
    fn produce(&self) -> Result<WorkStream, DispatchError> {
        let targets = self.load()?;
        Ok(Box::new(
            targets
                .into_iter()
                .enumerate()
                .map(|(id, target)| WorkItem::new(id, target)),
        ))
    }
}

/// 生成器工作源
///
/// 每次 `produce` 调用闭包获得一个新的有限迭代器，逐个产生工作项
pub struct GeneratorSource<F> {
    generator: F,
}

impl<F, I> GeneratorSource<F>
where
    F: Fn() -> I + Send + Sync,
    I: Iterator<Item = String> + Send + 'static,
{
    pub fn new(generator: F) -> Self {
        Self { generator }
    }
}

impl<F, I> WorkSource for GeneratorSource<F>
where
    F: Fn() -> I + Send + Sync,
    I: Iterator<Item = String> + Send + 'static,
{
    fn produce(&self) -> Result<WorkStream, DispatchError> {
        Ok(Box::new(
            (self.generator)()
                .enumerate()
                .map(|(id, target)| WorkItem::new(id, target)),
        ))
    }
}

/// 校验目标是否为 http(s) 绝对地址
pub fn validate_target(target: &str) -> Result<Url, String> {
    let url = Url::parse(target).map_err(|e| format!("invalid URL '{}': {}", target, e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme '{}' in '{}'", other, target)),
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
