//! 文档分析流程 - 流程层
//!
//! 核心职责：定义"一次提交"的完整处理流程
//!
//! 流程顺序：
//! 1. 检查文件数量
//! 2. 上传文件 → 收集成功的文件 ID
//! 3. 以阻塞模式调用工作流
//! 4. 解释 `outputs.result`

use tracing::{error, info, warn};

use crate::config::Config;
use crate::i18n::{t, t_with, Locale};
use crate::models::{UploadFile, UploadResponse, WorkflowInputs, WorkflowRequest};
use crate::services::{present, ResultView, UploadService, WorkflowService};
use crate::workflow::analysis_ctx::AnalysisCtx;

/// 流程失败的原因，最终以一句提示展示在表单旁
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisFailure {
    /// 没有选择文件
    NoFiles,
    /// 文件数超过上限
    TooManyFiles { max: usize },
    /// 单文件上传被拒绝，携带上游错误信息
    UploadRejected(String),
    /// 没有任何文件上传成功
    NoFileIds,
    /// 工作流调用失败或上游报告失败
    WorkflowFailed,
}

impl AnalysisFailure {
    /// 面向用户的提示
    pub fn message(&self, locale: Locale) -> String {
        match self {
            AnalysisFailure::NoFiles => t(locale, "chooseAtLeastOneFile"),
            AnalysisFailure::TooManyFiles { max } => t_with(locale, "maxFiles", &[("max", max.to_string())]),
            AnalysisFailure::UploadRejected(message) if !message.is_empty() => message.clone(),
            AnalysisFailure::UploadRejected(_) => t(locale, "uploadFailed"),
            AnalysisFailure::NoFileIds => t(locale, "noFileId"),
            AnalysisFailure::WorkflowFailed => t(locale, "workflowFailed"),
        }
    }
}

/// 文档分析流程
///
/// - 编排 上传 → 调用工作流 → 展示 的顺序
/// - 不持有任何可变状态
/// - 只依赖业务能力（services）
#[derive(Clone)]
pub struct AnalysisFlow {
    uploads: UploadService,
    workflows: WorkflowService,
    upload_user: String,
    max_files: usize,
}

impl AnalysisFlow {
    pub fn new(config: &Config, uploads: UploadService, workflows: WorkflowService) -> Self {
        Self {
            uploads,
            workflows,
            upload_user: config.default_upload_user.clone(),
            max_files: config.max_files,
        }
    }

    pub async fn run(&self, files: Vec<UploadFile>) -> Result<ResultView, AnalysisFailure> {
        let ctx = AnalysisCtx::new(files.len());

        // ========== 1. 检查文件数量 ==========
        if files.is_empty() {
            return Err(AnalysisFailure::NoFiles);
        }
        if files.len() > self.max_files {
            warn!("{} 文件数超过上限 {}", ctx, self.max_files);
            return Err(AnalysisFailure::TooManyFiles { max: self.max_files });
        }

        // ========== 2. 上传文件 ==========
        info!("{} 📤 开始上传", ctx);
        let upload = self.uploads.upload(files, &self.upload_user).await;

        if let UploadResponse::Rejected(error) = &upload {
            warn!("{} 上传失败: {} ({})", ctx, error.code, error.message);
            return Err(AnalysisFailure::UploadRejected(error.message.clone()));
        }

        let ids = upload.file_ids();
        if ids.is_empty() {
            warn!("{} 没有文件上传成功", ctx);
            return Err(AnalysisFailure::NoFileIds);
        }
        info!("{} ✓ 上传完成，{} 个文件可用于工作流", ctx, ids.len());

        // ========== 3. 调用工作流 ==========
        let request = WorkflowRequest::new(WorkflowInputs::from_file_ids(ids));
        let response = match self.workflows.run_blocking(request).await {
            Ok(response) => response,
            Err(e) => {
                error!("{} ❌ 工作流调用失败: {}", ctx, e);
                return Err(AnalysisFailure::WorkflowFailed);
            }
        };

        if let Some(message) = response.data.error_message() {
            warn!(
                "{} 工作流 {} 报告失败 (状态: {}): {}",
                ctx, response.workflow_run_id, response.data.status, message
            );
            return Err(AnalysisFailure::WorkflowFailed);
        }

        // ========== 4. 解释结果 ==========
        let view = present(response.data.result());
        info!(
            "{} ✓ 工作流 {} 完成，用时 {:.2}s，共 {} 步",
            ctx, response.workflow_run_id, response.data.elapsed_time, response.data.total_steps
        );

        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::DifyClient;

    fn flow(max_files: usize) -> AnalysisFlow {
        let config = Config {
            dify_api_base_url: "http://127.0.0.1:9/v1".to_string(),
            dify_api_key: "app-test".to_string(),
            max_files,
            ..Default::default()
        };
        let client = DifyClient::new(&config);
        AnalysisFlow::new(
            &config,
            UploadService::new(client.clone()),
            WorkflowService::new(client, config.default_workflow_user.clone()),
        )
    }

    #[tokio::test]
    async fn test_no_files_rejected_before_upload() {
        assert_eq!(flow(10).run(Vec::new()).await, Err(AnalysisFailure::NoFiles));
    }

    #[tokio::test]
    async fn test_too_many_files_rejected_before_upload() {
        let files = (0..3).map(|i| UploadFile::new(format!("{i}.pdf"), vec![1u8])).collect();
        assert_eq!(flow(2).run(files).await, Err(AnalysisFailure::TooManyFiles { max: 2 }));
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(AnalysisFailure::NoFiles.message(Locale::Zh), "请选择至少一个文件");
        assert_eq!(
            AnalysisFailure::TooManyFiles { max: 10 }.message(Locale::Zh),
            "一次最多上传 10 个文件"
        );
        assert_eq!(
            AnalysisFailure::UploadRejected("文件太大".to_string()).message(Locale::En),
            "文件太大"
        );
        assert_eq!(
            AnalysisFailure::UploadRejected(String::new()).message(Locale::En),
            "File upload failed"
        );
        assert_eq!(AnalysisFailure::WorkflowFailed.message(Locale::Zh), "执行工作流失败");
    }
}
