/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use crate::config::Config;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，未设置时按 `verbose` 选择 debug 或 info 级别
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "doc_analysis=debug,tower_http=debug"
    } else {
        "doc_analysis=info,tower_http=info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // 测试中可能被重复调用
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 文档分析服务启动");
    info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 监听地址: {}", config.bind_addr());
    info!("🔗 Dify API: {}", config.dify_api_base_url);
    info!("📄 单次最多文件数: {}", config.max_files);
    info!("{}", "=".repeat(60));
}

/// 记录一次批量上传的统计
///
/// # 参数
/// - `total`: 文件总数
/// - `succeeded`: 成功数量
pub fn log_upload_summary(total: usize, succeeded: usize) {
    let failed = total.saturating_sub(succeeded);
    if failed > 0 {
        warn!("📤 上传完成: 成功 {}/{}，失败 {}", succeeded, total, failed);
    } else {
        info!("📤 上传完成: 成功 {}/{}", succeeded, total);
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("文档分析系统", 2), "文档...");
        assert_eq!(truncate_text("short", 10), "short");
    }
}
