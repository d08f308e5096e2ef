use crate::error::{AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;

/// 程序配置
///
/// 可以从 TOML 文件加载，再由环境变量覆盖
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- Dify API 配置 ---
    pub dify_api_base_url: String,
    pub dify_api_key: String,
    // --- 本地服务配置 ---
    pub server_host: String,
    pub server_port: u16,
    /// 上传文件时未提供用户标识的默认值
    pub default_upload_user: String,
    /// 调用工作流时未提供用户标识的默认值
    pub default_workflow_user: String,
    /// 页面一次最多可以提交的文件数
    pub max_files: usize,
    /// 单个请求体的大小上限（字节）
    pub max_upload_bytes: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dify_api_base_url: "https://api.dify.ai/v1".to_string(),
            dify_api_key: String::new(),
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            default_upload_user: "default-user".to_string(),
            default_workflow_user: "user-default".to_string(),
            max_files: 10,
            max_upload_bytes: 100 * 1024 * 1024,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 加载配置
    ///
    /// 若设置了 `CONFIG_FILE`，先读取该 TOML 文件，再应用环境变量覆盖
    pub fn load() -> AppResult<Self> {
        match std::env::var("CONFIG_FILE") {
            Ok(path) => Self::from_toml_file(path)?.with_env_overrides().validated(),
            Err(_) => Self::from_env(),
        }
    }

    /// 只从环境变量加载配置
    pub fn from_env() -> AppResult<Self> {
        Self::default().with_env_overrides().validated()
    }

    /// 从 TOML 文件读取配置，缺失的字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::TomlParseFailed { source, .. } => ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })?;
        Ok(config)
    }

    fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlParseFailed {
            path: String::new(),
            source: e,
        })
    }

    fn with_env_overrides(self) -> Self {
        Self {
            dify_api_base_url: std::env::var("DIFY_API_BASE_URL").unwrap_or(self.dify_api_base_url),
            dify_api_key: std::env::var("DIFY_API_KEY").unwrap_or(self.dify_api_key),
            server_host: std::env::var("SERVER_HOST").unwrap_or(self.server_host),
            server_port: std::env::var("SERVER_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(self.server_port),
            default_upload_user: std::env::var("DEFAULT_UPLOAD_USER").unwrap_or(self.default_upload_user),
            default_workflow_user: std::env::var("DEFAULT_WORKFLOW_USER").unwrap_or(self.default_workflow_user),
            max_files: std::env::var("MAX_FILES").ok().and_then(|v| v.parse().ok()).unwrap_or(self.max_files),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES").ok().and_then(|v| v.parse().ok()).unwrap_or(self.max_upload_bytes),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
        }
    }

    /// API 密钥必须由外部注入
    fn validated(self) -> AppResult<Self> {
        if self.dify_api_key.trim().is_empty() {
            return Err(ConfigError::EnvVarNotFound {
                var_name: "DIFY_API_KEY".to_string(),
            }
            .into());
        }
        Ok(self)
    }

    /// 本地监听地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_partial_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            dify_api_key = "app-test"
            server_port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(config.dify_api_key, "app-test");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.dify_api_base_url, "https://api.dify.ai/v1");
        assert_eq!(config.max_files, 10);
        assert_eq!(config.default_upload_user, "default-user");
        assert_eq!(config.default_workflow_user, "user-default");
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = Config::from_toml_str("server_port = \"not a port\"").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParseFailed { .. }));
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let err = Config::default().validated().unwrap_err();
        assert!(err.to_string().contains("DIFY_API_KEY"));
    }

    #[test]
    fn test_from_env_overrides_defaults() {
        std::env::set_var("DIFY_API_KEY", "app-from-env");
        std::env::set_var("SERVER_PORT", "8123");
        std::env::set_var("MAX_FILES", "not-a-number");

        let config = Config::from_env();

        std::env::remove_var("DIFY_API_KEY");
        std::env::remove_var("SERVER_PORT");
        std::env::remove_var("MAX_FILES");

        let config = config.unwrap();
        assert_eq!(config.dify_api_key, "app-from-env");
        assert_eq!(config.server_port, 8123);
        // 无法解析的值保留默认
        assert_eq!(config.max_files, 10);
    }

    #[test]
    fn test_bind_addr() {
        let config = Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 4000,
            ..Default::default()
        };
        assert_eq!(config.bind_addr(), "127.0.0.1:4000");
    }
}
