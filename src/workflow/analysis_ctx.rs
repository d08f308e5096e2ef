//! 一次提交的处理上下文
//!
//! 封装"这是第几次提交、提交了几个文件"，只用于日志

use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SUBMISSION: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone)]
pub struct AnalysisCtx {
    /// 进程内递增的提交编号
    pub submission_id: u64,
    pub file_count: usize,
}

impl AnalysisCtx {
    pub fn new(file_count: usize) -> Self {
        Self {
            submission_id: NEXT_SUBMISSION.fetch_add(1, Ordering::Relaxed),
            file_count,
        }
    }
}

impl Display for AnalysisCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[提交 #{} 文件数 {}]", self.submission_id, self.file_count)
    }
}
