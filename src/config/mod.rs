// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置，包括调度器、HTTP 引擎、日志和指标配置
pub mod dispatch;
pub mod settings;
