//! 本地 HTTP 服务
//!
//! - `GET /` 上传页面
//! - `POST /analyze` 页面表单提交，服务端完成整个流程
//! - `POST /api/file` 文件上传代理
//! - `POST /api/workflow` 工作流代理
//! - `GET /healthz`

pub mod handlers;
pub mod templates;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::clients::DifyClient;
use crate::config::Config;
use crate::services::{UploadService, WorkflowService};
use crate::workflow::AnalysisFlow;

/// 所有请求共享的只读状态
pub struct AppState {
    pub config: Config,
    pub uploads: UploadService,
    pub workflows: WorkflowService,
    pub flow: AnalysisFlow,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let client = DifyClient::new(&config);
        let uploads = UploadService::new(client.clone());
        let workflows = WorkflowService::new(client, config.default_workflow_user.clone());
        let flow = AnalysisFlow::new(&config, uploads.clone(), workflows.clone());

        Self {
            config,
            uploads,
            workflows,
            flow,
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::index_page))
        .route("/analyze", post(handlers::analyze_page))
        .route("/api/file", post(handlers::api_file))
        .route("/api/workflow", post(handlers::api_workflow))
        .route("/healthz", get(handlers::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        // 只记录方法和路径
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}
