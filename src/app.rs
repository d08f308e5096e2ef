use crate::config::Config;
use crate::server::{self, AppState};
use crate::utils::logging::log_startup;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    state: Arc<AppState>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let state = Arc::new(AppState::new(config.clone()));

        Ok(Self { config, state })
    }

    /// 运行 HTTP 服务，收到 Ctrl-C 后优雅退出
    pub async fn run(self) -> Result<()> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("无法监听地址: {}", addr))?;

        info!("✓ 服务已启动: http://{}", addr);

        let router = server::build_router(self.state);
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP 服务异常退出")?;

        info!("👋 服务已停止");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("无法监听退出信号: {}", e);
        std::future::pending::<()>().await;
    }
    info!("收到退出信号，正在停止...");
}
