// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和调度参数
pub mod config;

/// 领域模块
///
/// 包含工作项、结果和批次等核心实体
pub mod domain;

/// 引擎模块
///
/// 定义操作接口并实现基于 HTTP 的抓取引擎
pub mod engines;

/// 基础设施模块
///
/// 提供指标导出等外部集成
pub mod infrastructure;

/// 队列模块
///
/// 实现工作源，为批次提供有限的工作项序列
pub mod queue;

/// 工具模块
///
/// 提供错误类型和日志初始化
pub mod utils;

/// 工作器模块
///
/// 实现有界并发的工作池和分块节流调度
pub mod workers;
