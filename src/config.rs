//! 配置系统
//! 从环境变量加载所有配置

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:3000"
    pub addr: String,
    /// 优雅关闭超时时间（秒）
    pub graceful_shutdown_timeout_secs: u64,
    /// 转发到远程 API 的最大请求体（字节）
    pub max_body_bytes: usize,
}

/// 远程 REST 后端，持有所有持久化状态
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// 基础 URL，例如 "http://backend:8000"
    pub base_url: String,
    pub login_path: String,
    pub refresh_path: String,
    /// 未设置时使用传输层默认值
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub access_cookie: String,
    pub refresh_cookie: String,
    /// 访问令牌 cookie 过期时间（秒）
    pub access_ttl_secs: u64,
    /// 刷新令牌 cookie 过期时间（秒）
    pub refresh_ttl_secs: u64,
    pub secure_cookies: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuardConfig {
    /// 管理后台路径前缀
    pub protected_prefix: String,
    pub login_path: String,
    /// 携带原始请求路径的查询参数
    pub return_param: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub guard: GuardConfig,
    pub logging: LoggingConfig,
}

impl SessionConfig {
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_secs)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_ttl_secs)
    }
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        // 添加默认配置
        settings = settings
            .set_default("server.addr", "0.0.0.0:3000")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("server.max_body_bytes", 2 * 1024 * 1024)?
            .set_default("api.base_url", "http://127.0.0.1:8000")?
            .set_default("api.login_path", "/api/auth/login/")?
            .set_default("api.refresh_path", "/api/auth/refresh/")?
            .set_default("session.access_cookie", "admin_access_token")?
            .set_default("session.refresh_cookie", "admin_refresh_token")?
            .set_default("session.access_ttl_secs", 86400)?
            .set_default("session.refresh_ttl_secs", 604800)?
            .set_default("session.secure_cookies", false)?
            .set_default("guard.protected_prefix", "/admin")?
            .set_default("guard.login_path", "/admin/login")?
            .set_default("guard.return_param", "from")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?;

        // 从环境变量加载配置（前缀为 DEALER_）
        settings = settings.add_source(
            Environment::with_prefix("DEALER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        // 验证配置
        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 验证端口范围
        if let Some(port_str) = self.server.addr.split(':').next_back() {
            if let Ok(port) = port_str.parse::<u16>() {
                if port != 0 && port < 1024 {
                    return Err(ConfigError::Message("Server port should be >= 1024".to_string()));
                }
            }
        }

        // 验证日志级别
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        // 验证日志格式
        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        let base_url = Url::parse(&self.api.base_url)
            .map_err(|e| ConfigError::Message(format!("Invalid api.base_url: {}", e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::Message(format!(
                "api.base_url must use http or https, got {}",
                base_url.scheme()
            )));
        }

        for (name, path) in [
            ("api.login_path", &self.api.login_path),
            ("api.refresh_path", &self.api.refresh_path),
            ("guard.protected_prefix", &self.guard.protected_prefix),
            ("guard.login_path", &self.guard.login_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::Message(format!("{} must start with '/'", name)));
            }
        }

        if self.guard.login_path.trim_end_matches('/')
            == self.guard.protected_prefix.trim_end_matches('/')
        {
            return Err(ConfigError::Message(
                "guard.login_path must differ from guard.protected_prefix".to_string(),
            ));
        }

        if self.guard.return_param.trim().is_empty() {
            return Err(ConfigError::Message("guard.return_param must not be empty".to_string()));
        }

        if self.session.access_cookie.is_empty()
            || self.session.refresh_cookie.is_empty()
            || self.session.access_cookie == self.session.refresh_cookie
        {
            return Err(ConfigError::Message(
                "session cookie names must be non-empty and distinct".to_string(),
            ));
        }

        // 验证令牌过期时间
        if self.session.access_ttl_secs == 0 {
            return Err(ConfigError::Message("access_ttl_secs must be positive".to_string()));
        }

        if self.session.refresh_ttl_secs < self.session.access_ttl_secs {
            return Err(ConfigError::Message(
                "refresh_ttl_secs must be >= access_ttl_secs".to_string(),
            ));
        }

        Ok(())
    }
}
