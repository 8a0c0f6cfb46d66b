// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心实体，包括：
/// - 工作项（work_item）：调度的最小单元
/// - 调度结果（dispatch_result）：每个工作项恰好一个的执行结果
/// - 批次（batch）：一次完整调度及其报告
pub mod batch;
pub mod dispatch_result;
pub mod work_item;
