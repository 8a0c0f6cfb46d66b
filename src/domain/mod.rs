// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含调度器的核心数据模型，不依赖于任何网络实现。
pub mod models;
