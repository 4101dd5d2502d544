//! 认证错误模型
//! 认证与远程 API 错误类型

use reqwest::StatusCode;
use std::sync::Arc;
use thiserror::Error;

/// 原始错误响应体最多保留的字符数
pub const MAX_ERROR_CHARS: usize = 200;

#[derive(Error, Debug)]
pub enum AuthError {
    /// 远程 API 拒绝登录，携带可读的错误信息
    #[error("{0}")]
    InvalidCredentials(String),

    /// 请求被 401 拒绝且会话无法恢复
    #[error("Not authenticated")]
    Unauthorized,

    /// 刷新接口返回非 2xx
    #[error("Token refresh rejected (HTTP {status}): {message}")]
    TokenRefresh { status: StatusCode, message: String },

    /// 并发调用共享的刷新失败
    #[error("Token refresh failed: {0}")]
    RefreshFailed(Arc<AuthError>),

    /// 资源接口返回非 2xx
    #[error("Remote API error (HTTP {status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// 会话已失效、需要重新登录时为 true
    pub fn is_session_lost(&self) -> bool {
        matches!(
            self,
            AuthError::Unauthorized | AuthError::TokenRefresh { .. } | AuthError::RefreshFailed(_)
        )
    }

    /// 未拿到 HTTP 状态码的连接级错误为 true
    pub fn is_transport(&self) -> bool {
        match self {
            AuthError::Http(e) => e.status().is_none(),
            AuthError::RefreshFailed(inner) => inner.is_transport(),
            _ => false,
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

/// 从远程错误响应体提取可读信息
///
/// 优先取 JSON `detail` 字段，其次取去掉首尾空白并截断到
/// [`MAX_ERROR_CHARS`] 的原文，响应体为空时用 `fallback`
pub fn error_message(body: &str, fallback: impl FnOnce() -> String) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
            let detail = detail.trim();
            if !detail.is_empty() {
                return detail.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        fallback()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
