//! 工作流相关的数据模型

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// 工作流响应模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseMode {
    /// 等待工作流执行完毕，返回完整 JSON
    #[default]
    Blocking,
    /// 以事件流方式逐步返回
    Streaming,
}

impl ResponseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMode::Blocking => "blocking",
            ResponseMode::Streaming => "streaming",
        }
    }

    /// 按请求中的取值判断如何读取上游响应
    ///
    /// 只有 `streaming` 按事件流转发，其余取值都按 JSON 读取
    pub fn from_wire(mode: &str) -> Self {
        if mode == ResponseMode::Streaming.as_str() {
            ResponseMode::Streaming
        } else {
            ResponseMode::Blocking
        }
    }
}

/// 工作流输入中的单个文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowInputFile {
    pub file_type: String,
    pub transfer_method: String,
    pub upload_file_id: String,
}

impl WorkflowInputFile {
    /// 以本地上传方式引用一个已上传的文档
    pub fn document(upload_file_id: impl Into<String>) -> Self {
        Self {
            file_type: "document".to_string(),
            transfer_method: "local_file".to_string(),
            upload_file_id: upload_file_id.into(),
        }
    }
}

/// 页面流程构造的工作流输入：`files` 加上其余变量
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowInputs {
    pub files: Vec<WorkflowInputFile>,
    pub extra: Map<String, Value>,
}

impl WorkflowInputs {
    pub fn from_file_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            files: ids.into_iter().map(WorkflowInputFile::document).collect(),
            extra: Map::new(),
        }
    }
}

impl From<WorkflowInputs> for Value {
    fn from(inputs: WorkflowInputs) -> Self {
        let files = inputs
            .files
            .into_iter()
            .map(|file| {
                json!({
                    "type": file.file_type,
                    "transfer_method": file.transfer_method,
                    "upload_file_id": file.upload_file_id,
                })
            })
            .collect();

        let mut map = Map::new();
        map.insert("files".to_string(), Value::Array(files));
        map.extend(inputs.extra);
        Value::Object(map)
    }
}

/// `/api/workflow` 接收的请求体
///
/// `inputs` 和 `response_mode` 不做校验，原样转发给上游
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowRequest {
    #[serde(default)]
    pub inputs: Option<Value>,
    pub transfer_method: Option<String>,
    pub upload_file_id: Option<String>,
    pub response_mode: Option<String>,
    pub user: Option<String>,
}

impl WorkflowRequest {
    pub fn new(inputs: WorkflowInputs) -> Self {
        Self {
            inputs: Some(inputs.into()),
            ..Default::default()
        }
    }
}

/// 发往上游 `/workflows/run` 的请求体，缺省的可选字段不序列化
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowRunPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Value>,
    pub response_mode: String,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_file_id: Option<String>,
}

impl WorkflowRunPayload {
    /// 上游响应的读取方式
    pub fn mode(&self) -> ResponseMode {
        ResponseMode::from_wire(&self.response_mode)
    }

    /// `inputs.files` 中的条目数，仅用于日志
    pub fn file_count(&self) -> usize {
        self.inputs
            .as_ref()
            .and_then(|inputs| inputs.get("files"))
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

/// 工作流输出
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WorkflowOutputs {
    /// 结果字段，可能是字符串、JSON 字符串或字符串数组
    #[serde(default)]
    pub result: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 工作流数据
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowData {
    pub id: String,
    #[serde(default)]
    pub workflow_id: String,
    /// running / succeeded / failed / ...
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub outputs: Option<WorkflowOutputs>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub elapsed_time: f64,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub total_steps: u64,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub finished_at: Option<i64>,
}

impl WorkflowData {
    /// 上游报告的错误信息（空字符串视为无错误）
    pub fn error_message(&self) -> Option<String> {
        match &self.error {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }

    /// `outputs.result`，不存在时为 `Value::Null`
    pub fn result(&self) -> &Value {
        static NULL: Value = Value::Null;
        self.outputs.as_ref().map(|o| &o.result).unwrap_or(&NULL)
    }
}

/// 阻塞模式下的工作流响应
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowResponse {
    pub task_id: String,
    pub workflow_run_id: String,
    pub data: WorkflowData,
}
