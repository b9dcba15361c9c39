// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 匹配引擎（job_matcher）：按标题同义词与地点过滤职位
/// - 雇主编排（company_orchestrator）：逐个雇主抓取并在失败时退回聚合源
/// - 搜索服务（search_service）：缓存、编排与降级兜底的顶层门面
pub mod company_orchestrator;
pub mod job_matcher;
pub mod search_service;

pub use company_orchestrator::{CompanyOrchestrator, OrchestratorConfig};
pub use job_matcher::JobMatcher;
pub use search_service::JobSearchService;
