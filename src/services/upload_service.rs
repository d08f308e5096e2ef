//! 文件上传服务 - 业务能力层
//!
//! 把一组文件并发转发到上游上传接口，并把每个文件的结果聚合成统一的响应

use crate::clients::DifyClient;
use crate::error::{AppError, AppResult};
use crate::models::{BatchUploadResponse, FileUploadEntry, UploadError, UploadFile, UploadResponse, UploadResult};
use futures::future::join_all;
use tracing::{error, info};

/// 文件上传服务
///
/// 职责：
/// - 每个文件独立上传，互不影响
/// - 不限制并发数，不保证完成顺序
/// - 不限制文件数量（由调用方负责）
/// - 不重试
#[derive(Clone)]
pub struct UploadService {
    client: DifyClient,
}

impl UploadService {
    pub fn new(client: DifyClient) -> Self {
        Self { client }
    }

    /// 上传所有文件并返回聚合后的响应
    ///
    /// 任何一个文件出现网络错误或无法解析的响应时，整个请求以通用内部错误结束，
    /// 不暴露部分结果
    pub async fn upload(&self, files: Vec<UploadFile>, user: &str) -> UploadResponse {
        if files.is_empty() {
            return UploadResponse::Rejected(UploadError::no_file_uploaded());
        }

        match self.upload_all(files, user).await {
            Ok(entries) => aggregate(entries),
            Err(e) => {
                error!("上传文件到 Dify API 时出错: {}", e);
                UploadResponse::Rejected(UploadError::internal())
            }
        }
    }

    /// 并发上传所有文件，等待全部结束后返回每个文件的结果
    pub async fn upload_all(&self, files: Vec<UploadFile>, user: &str) -> AppResult<Vec<FileUploadEntry>> {
        let uploads = files.iter().map(|file| async move {
            let result = self.client.upload_file(file, user).await?;
            Ok::<_, AppError>(FileUploadEntry {
                filename: file.name.clone(),
                result,
            })
        });

        let entries = join_all(uploads).await.into_iter().collect::<AppResult<Vec<_>>>()?;

        let succeeded = entries.iter().filter(|e| e.result.is_success()).count();
        crate::utils::logging::log_upload_summary(entries.len(), succeeded);

        Ok(entries)
    }
}

/// 把每个文件的结果聚合成接口响应
///
/// - 单个文件失败：直接返回该错误
/// - 单个文件成功：直接返回成功内容，不包装成数组
/// - 其余情况：返回 `{success, message, results}`
pub fn aggregate(mut entries: Vec<FileUploadEntry>) -> UploadResponse {
    if entries.len() == 1 {
        if let Some(entry) = entries.pop() {
            return match entry.result {
                UploadResult::Success(success) => UploadResponse::Uploaded(success),
                UploadResult::Failure { error } => UploadResponse::Rejected(error),
            };
        }
    }

    info!("批量上传完成: 共 {} 个文件", entries.len());

    UploadResponse::Batch(BatchUploadResponse {
        success: true,
        message: format!("成功上传{}个文件", entries.len()),
        results: entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileUploadSuccess;
    use serde_json::Map;

    fn success(id: &str, name: &str) -> FileUploadEntry {
        FileUploadEntry {
            filename: name.to_string(),
            result: UploadResult::Success(FileUploadSuccess {
                id: id.to_string(),
                name: name.to_string(),
                size: 12,
                extension: "pdf".to_string(),
                mime_type: "application/pdf".to_string(),
                created_by: "user-1".to_string(),
                created_at: "1705407629".to_string(),
                extra: Map::new(),
            }),
        }
    }

    fn failure(name: &str, code: &str) -> FileUploadEntry {
        FileUploadEntry {
            filename: name.to_string(),
            result: UploadResult::Failure {
                error: UploadError::from_code(code),
            },
        }
    }

    #[test]
    fn test_single_success_is_unwrapped() {
        let response = aggregate(vec![success("id-1", "a.pdf")]);

        let body = response.body();
        assert_eq!(response.status(), 200);
        assert_eq!(body["id"], "id-1");
        assert!(body.get("results").is_none());
        assert_eq!(response.file_ids(), vec!["id-1".to_string()]);
    }

    #[test]
    fn test_single_failure_uses_mapped_status() {
        let response = aggregate(vec![failure("big.pdf", "file_too_large")]);

        assert_eq!(response.status(), 413);
        assert_eq!(response.body()["error"]["message"], "文件太大");
    }

    #[test]
    fn test_multiple_files_are_wrapped() {
        let response = aggregate(vec![
            success("id-1", "a.pdf"),
            failure("b.exe", "unsupported_file_type"),
            success("id-3", "c.docx"),
        ]);

        let body = response.body();
        assert_eq!(response.status(), 200);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "成功上传3个文件");
        assert_eq!(body["results"].as_array().map(Vec::len), Some(3));
        assert_eq!(body["results"][1]["filename"], "b.exe");
        assert_eq!(body["results"][1]["result"]["error"]["status"], 415);
    }

    #[test]
    fn test_file_ids_skip_failures() {
        let response = aggregate(vec![
            success("id-1", "a.pdf"),
            failure("b.pdf", "s3_connection_failed"),
            success("id-3", "c.pdf"),
        ]);

        assert_eq!(response.file_ids(), vec!["id-1".to_string(), "id-3".to_string()]);
    }

    #[test]
    fn test_all_failures_still_wrapped_with_200() {
        let response = aggregate(vec![failure("a", "file_too_large"), failure("b", "unknown")]);

        assert_eq!(response.status(), 200);
        assert!(response.file_ids().is_empty());
    }
}
