/// Dify API 客户端
///
/// 封装与 Dify 文件上传、工作流执行接口相关的调用逻辑
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{FileUploadSuccess, UploadError, UploadFile, UploadResult, WorkflowRunPayload};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, warn};

const UPLOAD_ENDPOINT: &str = "files/upload";
const WORKFLOW_ENDPOINT: &str = "workflows/run";

/// Dify API 客户端
///
/// 内部的 `reqwest::Client` 复用连接池，克隆代价很小
#[derive(Clone)]
pub struct DifyClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl DifyClient {
    /// 创建新的 Dify 客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.dify_api_base_url.trim_end_matches('/').to_string(),
            api_key: config.dify_api_key.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// 上传单个文件
    ///
    /// # 参数
    /// - `file`: 待上传的文件
    /// - `user`: 用户标识
    ///
    /// # 返回
    /// 上游拒绝该文件时返回 `UploadResult::Failure`；
    /// 只有网络错误或响应无法解析时才返回 `Err`
    pub async fn upload_file(&self, file: &UploadFile, user: &str) -> AppResult<UploadResult> {
        let url = self.endpoint(UPLOAD_ENDPOINT);

        debug!("上传文件: {} ({} 字节)", file.name, file.data.len());

        let form = Form::new()
            .part("file", build_file_part(file))
            .text("user", user.to_string());

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::api_parse_failed(&url, e))?;

        if !status.is_success() {
            let error = UploadError::from_upstream_body(&body);
            warn!(
                "文件 {} 被上游拒绝: HTTP {} -> {} ({})",
                file.name, status, error.code, error.message
            );
            return Ok(UploadResult::Failure { error });
        }

        let success: FileUploadSuccess =
            serde_json::from_value(body).map_err(|e| AppError::api_parse_failed(&url, e))?;

        debug!("文件 {} 上传成功, id={}", file.name, success.id);

        Ok(UploadResult::Success(success))
    }

    /// 调用工作流
    ///
    /// 返回未读取的上游响应，由调用方决定按 JSON 解析还是按字节流透传
    pub async fn run_workflow(&self, payload: &WorkflowRunPayload) -> AppResult<reqwest::Response> {
        let url = self.endpoint(WORKFLOW_ENDPOINT);

        debug!(
            "调用工作流: 模式 {}, 文件数 {}",
            payload.response_mode,
            payload.file_count()
        );

        self.http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))
    }
}

/// 构建 multipart 文件字段，非法的 MIME 类型会被忽略
fn build_file_part(file: &UploadFile) -> Part {
    let bare = || Part::bytes(file.data.to_vec()).file_name(file.name.clone());

    match file.content_type.as_deref() {
        Some(content_type) => bare().mime_str(content_type).unwrap_or_else(|_| bare()),
        None => bare(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let config = Config {
            dify_api_base_url: "http://localhost:5001/v1/".to_string(),
            dify_api_key: "app-test".to_string(),
            ..Default::default()
        };
        let client = DifyClient::new(&config);

        assert_eq!(client.endpoint(UPLOAD_ENDPOINT), "http://localhost:5001/v1/files/upload");
        assert_eq!(client.endpoint(WORKFLOW_ENDPOINT), "http://localhost:5001/v1/workflows/run");
    }
}
