//! 文件上传相关的数据模型
//!
//! 包括上游成功响应、错误代码表、单文件结果以及聚合后的响应

use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 待上传的文件
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// 用户提交时的文件名
    pub name: String,
    /// 浏览器声明的 MIME 类型
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// 文件上传成功时上游返回的内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileUploadSuccess {
    /// UUID
    pub id: String,
    pub name: String,
    /// 文件大小（byte）
    pub size: u64,
    /// 文件后缀
    #[serde(default)]
    pub extension: String,
    #[serde(default)]
    pub mime_type: String,
    /// 上传人 ID
    #[serde(default)]
    pub created_by: String,
    /// 上传时间，上游可能给出时间戳数字或字符串
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: String,
    /// 上游返回的其余字段，原样透传
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 兼容数字和字符串两种时间戳格式
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct TimestampVisitor;

    impl<'de> Visitor<'de> for TimestampVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer timestamp")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(TimestampVisitor)
}

/// 上传错误，对应错误代码表中的一项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadError {
    /// 错误代码
    pub code: String,
    /// 错误描述信息
    pub message: String,
    /// HTTP 状态码
    pub status: u16,
}

/// 错误代码表中的静态条目
#[derive(Debug, Clone, Copy)]
pub struct ErrorCodeEntry {
    pub code: &'static str,
    pub message: &'static str,
    pub status: u16,
}

pub const INTERNAL_SERVER_ERROR: &str = "internal_server_error";
pub const NO_FILE_UPLOADED: &str = "no_file_uploaded";

/// 上游错误代码映射表
pub static ERROR_CODES: phf::Map<&'static str, ErrorCodeEntry> = phf::phf_map! {
    "no_file_uploaded" => ErrorCodeEntry { code: "no_file_uploaded", message: "必须提供文件", status: 400 },
    "too_many_files" => ErrorCodeEntry { code: "too_many_files", message: "目前只接受一个文件", status: 400 },
    "unsupported_preview" => ErrorCodeEntry { code: "unsupported_preview", message: "该文件不支持预览", status: 400 },
    "unsupported_estimate" => ErrorCodeEntry { code: "unsupported_estimate", message: "该文件不支持估算", status: 400 },
    "file_too_large" => ErrorCodeEntry { code: "file_too_large", message: "文件太大", status: 413 },
    "unsupported_file_type" => ErrorCodeEntry {
        code: "unsupported_file_type",
        message: "不支持的扩展名，当前只接受文档类文件",
        status: 415,
    },
    "s3_connection_failed" => ErrorCodeEntry { code: "s3_connection_failed", message: "无法连接到 S3 服务", status: 503 },
    "s3_permission_denied" => ErrorCodeEntry { code: "s3_permission_denied", message: "无权限上传文件到 S3", status: 503 },
    "s3_file_too_large" => ErrorCodeEntry { code: "s3_file_too_large", message: "文件超出 S3 大小限制", status: 503 },
    "internal_server_error" => ErrorCodeEntry { code: "internal_server_error", message: "文件上传失败", status: 500 },
};

impl From<&ErrorCodeEntry> for UploadError {
    fn from(entry: &ErrorCodeEntry) -> Self {
        Self {
            code: entry.code.to_string(),
            message: entry.message.to_string(),
            status: entry.status,
        }
    }
}

impl UploadError {
    /// 根据上游错误代码查表，未知代码回落到 `internal_server_error`
    pub fn from_code(code: &str) -> Self {
        ERROR_CODES
            .get(code)
            .map(UploadError::from)
            .unwrap_or_else(Self::internal)
    }

    /// 通用内部错误
    pub fn internal() -> Self {
        Self::from(&ERROR_CODES[INTERNAL_SERVER_ERROR])
    }

    /// 未提供任何文件
    pub fn no_file_uploaded() -> Self {
        Self::from(&ERROR_CODES[NO_FILE_UPLOADED])
    }

    /// 从上游错误响应体中提取错误代码并查表
    ///
    /// 优先读取 `error.code`，其次读取顶层的 `code`
    pub fn from_upstream_body(body: &Value) -> Self {
        let code = body
            .get("error")
            .and_then(|e| e.get("code"))
            .or_else(|| body.get("code"))
            .and_then(Value::as_str)
            .unwrap_or(INTERNAL_SERVER_ERROR);
        Self::from_code(code)
    }
}

/// 单个文件的上传结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadResult {
    Success(FileUploadSuccess),
    Failure { error: UploadError },
}

impl UploadResult {
    pub fn file_id(&self) -> Option<&str> {
        match self {
            UploadResult::Success(success) => Some(success.id.as_str()),
            UploadResult::Failure { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadResult::Success(_))
    }
}

/// 带文件名的上传结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileUploadEntry {
    pub filename: String,
    pub result: UploadResult,
}

/// 多文件上传的聚合响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchUploadResponse {
    pub success: bool,
    pub message: String,
    pub results: Vec<FileUploadEntry>,
}

/// `/api/file` 的响应
///
/// 单文件成功时直接返回上传结果，单文件失败时返回 `{error}`，
/// 其余情况返回带 `results` 的聚合结构
#[derive(Debug, Clone, PartialEq)]
pub enum UploadResponse {
    Uploaded(FileUploadSuccess),
    Rejected(UploadError),
    Batch(BatchUploadResponse),
}

impl UploadResponse {
    /// 响应使用的 HTTP 状态码
    pub fn status(&self) -> u16 {
        match self {
            UploadResponse::Rejected(error) => error.status,
            _ => 200,
        }
    }

    /// 响应体
    pub fn body(&self) -> Value {
        match self {
            UploadResponse::Uploaded(success) => serde_json::to_value(success).unwrap_or_default(),
            UploadResponse::Rejected(error) => serde_json::json!({ "error": error }),
            UploadResponse::Batch(batch) => serde_json::to_value(batch).unwrap_or_default(),
        }
    }

    /// 提取所有成功上传的文件 ID，失败的文件被忽略
    pub fn file_ids(&self) -> Vec<String> {
        match self {
            UploadResponse::Uploaded(success) => vec![success.id.clone()],
            UploadResponse::Rejected(_) => Vec::new(),
            UploadResponse::Batch(batch) => batch
                .results
                .iter()
                .filter_map(|entry| entry.result.file_id())
                .map(str::to_string)
                .collect(),
        }
    }
}
