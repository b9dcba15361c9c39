// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 测试主模块
///
/// 组织集成测试和单元测试，只通过公开 API 使用 crate
mod integration;

// === Unit Tests ===
mod unit;
