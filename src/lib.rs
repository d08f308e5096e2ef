//! # Doc Analysis
//!
//! 一个把文档交给 Dify 工作流分析、并把结果渲染成标签视图的 Web 服务
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 持有 HTTP 连接池，只暴露上游接口
//! - `DifyClient` - 文件上传 / 工作流执行
//!
//! ### ② 业务能力层（Services）
//! - `UploadService` - 并发上传并聚合结果
//! - `WorkflowService` - 调用工作流（阻塞 / 流式）
//! - `result_presenter` - 解释工作流结果
//!
//! ### ③ 流程层（Workflow）
//! - `AnalysisFlow` - 一次提交的完整流程（上传 → 工作流 → 展示）
//!
//! ### ④ 接入层（Server）
//! - `server/` - axum 路由、API 代理和页面渲染
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod i18n;
pub mod models;
pub mod server;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::DifyClient;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use server::{build_router, AppState};
pub use services::{UploadService, WorkflowService};
pub use workflow::AnalysisFlow;
