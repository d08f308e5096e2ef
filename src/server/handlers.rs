use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Multipart, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use super::templates::{render_page, PageView};
use super::AppState;
use crate::error::AppResult;
use crate::i18n::{t, Locale};
use crate::models::{UploadError, UploadFile, UploadResponse, WorkflowRequest};
use crate::services::{WorkflowOutcome, WORKFLOW_FAILED_MESSAGE};

// --- Query structs ---

#[derive(Deserialize)]
pub struct PageQuery {
    lang: Option<String>,
}

// --- Form parsing ---

/// 表单中提交的文件和用户标识
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<UploadFile>,
    pub user: Option<String>,
}

/// 读取 multipart 表单，`file` 字段可重复
///
/// 浏览器在未选择文件时会提交一个没有文件名且内容为空的 `file` 字段，这种字段被忽略
pub async fn read_upload_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                if filename.is_empty() && data.is_empty() {
                    continue;
                }
                let file = UploadFile::new(filename, data);
                form.files.push(match content_type {
                    Some(content_type) => file.with_content_type(content_type),
                    None => file,
                });
            }
            "user" => form.user = Some(field.text().await?),
            _ => {}
        }
    }

    Ok(form)
}

impl IntoResponse for UploadResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body())).into_response()
    }
}

// --- API handlers ---

/// `POST /api/file`
pub async fn api_file(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let form = match read_upload_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            error!("解析上传表单失败: {}", e);
            return UploadResponse::Rejected(UploadError::internal()).into_response();
        }
    };

    let user = form
        .user
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| state.config.default_upload_user.clone());

    state.uploads.upload(form.files, &user).await.into_response()
}

/// `POST /api/workflow`
pub async fn api_workflow(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<WorkflowRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!("工作流请求体无效: {}", rejection.body_text());
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": rejection.body_text() }))).into_response();
        }
    };

    match state.workflows.invoke(request).await {
        Ok(WorkflowOutcome::Completed(data)) => Json(data).into_response(),
        Ok(WorkflowOutcome::Streaming(upstream)) => relay_event_stream(upstream),
        Err(e) => {
            error!("Workflow API error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": WORKFLOW_FAILED_MESSAGE })),
            )
                .into_response()
        }
    }
}

/// 逐块转发上游事件流，不缓冲、不解析
fn relay_event_stream(upstream: reqwest::Response) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Body::from_stream(upstream.bytes_stream()),
    )
        .into_response()
}

pub async fn health() -> &'static str {
    "ok"
}

// --- Page handlers ---

/// `GET /`
pub async fn index_page(State(state): State<Arc<AppState>>, Query(query): Query<PageQuery>) -> Html<String> {
    Html(render_page(&PageView {
        locale: Locale::parse(query.lang.as_deref()),
        max_files: state.config.max_files,
        ..Default::default()
    }))
}

/// `POST /analyze`：上传、调用工作流并渲染结果
pub async fn analyze_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
    multipart: Multipart,
) -> Html<String> {
    let locale = Locale::parse(query.lang.as_deref());
    let mut view = PageView {
        locale,
        max_files: state.config.max_files,
        ..Default::default()
    };

    match read_upload_form(multipart).await {
        Ok(form) => {
            view.selected_files = form.files.iter().map(|f| f.name.clone()).collect();
            match state.flow.run(form.files).await {
                Ok(result) => view.result = Some(result),
                Err(failure) => view.error = Some(failure.message(locale)),
            }
        }
        Err(e) => {
            warn!("解析页面表单失败: {}", e);
            view.error = Some(t(locale, "error"));
        }
    }

    Html(render_page(&view))
}
