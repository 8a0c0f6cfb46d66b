// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供有界并发的批次调度功能
/// 包括常驻工作池、分块节流调度和单项执行
pub mod dispatcher;
mod paced;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_support;

pub use dispatcher::Dispatcher;
pub use worker::Worker;
