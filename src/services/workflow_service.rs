//! 工作流调用服务 - 业务能力层
//!
//! 把文件 ID 组装成工作流输入并提交到上游，支持阻塞和流式两种模式

use crate::clients::DifyClient;
use crate::error::{AppError, AppResult};
use crate::models::{ResponseMode, WorkflowRequest, WorkflowResponse, WorkflowRunPayload};
use serde_json::Value;
use tracing::{debug, info};

/// 工作流调用失败时返回给调用方的固定信息
pub const WORKFLOW_FAILED_MESSAGE: &str = "调用工作流API失败";

/// 工作流调用结果
pub enum WorkflowOutcome {
    /// 阻塞模式：上游返回的 JSON，原样透传
    Completed(Value),
    /// 流式模式：尚未读取的上游响应，由调用方逐块转发
    Streaming(reqwest::Response),
}

/// 工作流调用服务
///
/// 不重试、不取消、不设置本地超时
#[derive(Clone)]
pub struct WorkflowService {
    client: DifyClient,
    default_user: String,
}

impl WorkflowService {
    pub fn new(client: DifyClient, default_user: impl Into<String>) -> Self {
        Self {
            client,
            default_user: default_user.into(),
        }
    }

    /// 根据请求构建发往上游的请求体
    pub fn build_payload(&self, request: WorkflowRequest) -> WorkflowRunPayload {
        WorkflowRunPayload {
            inputs: request.inputs,
            response_mode: request
                .response_mode
                .unwrap_or_else(|| ResponseMode::Blocking.as_str().to_string()),
            user: request.user.unwrap_or_else(|| self.default_user.clone()),
            transfer_method: request.transfer_method,
            upload_file_id: request.upload_file_id,
        }
    }

    /// 调用工作流
    ///
    /// 上游报告的工作流失败保留在返回的 JSON 中，不转换为本地错误
    pub async fn invoke(&self, request: WorkflowRequest) -> AppResult<WorkflowOutcome> {
        let payload = self.build_payload(request);
        let response = self.client.run_workflow(&payload).await?;

        info!(
            "工作流已提交: 模式 {}, 上游状态 {}",
            payload.response_mode,
            response.status()
        );

        match payload.mode() {
            ResponseMode::Streaming => Ok(WorkflowOutcome::Streaming(response)),
            ResponseMode::Blocking => {
                let data: Value = response
                    .json()
                    .await
                    .map_err(|e| AppError::api_parse_failed("workflows/run", e))?;
                debug!("工作流返回: {}", crate::utils::logging::truncate_text(&data.to_string(), 200));
                Ok(WorkflowOutcome::Completed(data))
            }
        }
    }

    /// 以阻塞模式调用工作流并解析为结构化响应
    pub async fn run_blocking(&self, mut request: WorkflowRequest) -> AppResult<WorkflowResponse> {
        request.response_mode = Some(ResponseMode::Blocking.as_str().to_string());

        match self.invoke(request).await? {
            WorkflowOutcome::Completed(data) => {
                serde_json::from_value(data).map_err(|e| AppError::api_parse_failed("workflows/run", e))
            }
            WorkflowOutcome::Streaming(_) => Err(AppError::Other("阻塞模式返回了流式响应".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::WorkflowInputs;

    fn service() -> WorkflowService {
        let config = Config {
            dify_api_key: "app-test".to_string(),
            ..Default::default()
        };
        WorkflowService::new(DifyClient::new(&config), config.default_workflow_user.clone())
    }

    #[test]
    fn test_payload_defaults() {
        let payload = service().build_payload(WorkflowRequest::new(WorkflowInputs::from_file_ids(["f1"])));

        assert_eq!(payload.response_mode, "blocking");
        assert_eq!(payload.mode(), ResponseMode::Blocking);
        assert_eq!(payload.user, "user-default");
        assert_eq!(payload.file_count(), 1);
        assert_eq!(payload.inputs.as_ref().unwrap()["files"][0]["upload_file_id"], "f1");
    }

    #[test]
    fn test_payload_keeps_caller_fields() {
        let request = WorkflowRequest {
            response_mode: Some("streaming".to_string()),
            user: Some("alice".to_string()),
            transfer_method: Some("local_file".to_string()),
            upload_file_id: Some("f9".to_string()),
            ..Default::default()
        };

        let payload = service().build_payload(request);
        assert_eq!(payload.mode(), ResponseMode::Streaming);
        assert_eq!(payload.user, "alice");
        assert_eq!(payload.transfer_method.as_deref(), Some("local_file"));
        assert_eq!(payload.upload_file_id.as_deref(), Some("f9"));
        assert!(payload.inputs.is_none());
        assert_eq!(payload.file_count(), 0);
    }

    #[test]
    fn test_unknown_mode_is_forwarded_unchanged() {
        let request = WorkflowRequest {
            response_mode: Some("async".to_string()),
            ..Default::default()
        };

        let payload = service().build_payload(request);
        assert_eq!(payload.response_mode, "async");
        assert_eq!(payload.mode(), ResponseMode::Blocking);
    }
}
