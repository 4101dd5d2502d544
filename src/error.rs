//! 统一错误模型
//! 定义所有错误类型和错误响应格式

use crate::auth::AuthError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// 登录被拒绝，信息直接显示在登录表单
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// 刷新失败导致会话丢失，客户端需跳转到 `redirect`
    #[error("Session expired: {message}")]
    SessionExpired { message: String, redirect: String },

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Upstream error ({status}): {message}")]
    Upstream { status: StatusCode, message: String },

    #[error("Remote API unreachable: {0}")]
    BadGateway(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) | AppError::SessionExpired { .. } => {
                StatusCode::UNAUTHORIZED
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { status, .. } => *status,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            AppError::Authentication(msg) => msg.clone(),
            AppError::SessionExpired { .. } => "Session expired, please log in again".to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Upstream { message, .. } => message.clone(),
            AppError::BadGateway(_) => "Remote API unreachable".to_string(),
            AppError::Config(_) => "Configuration error".to_string(),
            AppError::Internal => "Internal server error".to_string(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }

    /// 客户端下一步应跳转的地址
    pub fn redirect(&self) -> Option<&str> {
        match self {
            AppError::SessionExpired { redirect, .. } => Some(redirect),
            _ => None,
        }
    }

    /// 转换认证错误，会话丢失时跳转到 `login_path`
    pub fn from_auth(err: AuthError, login_path: &str) -> Self {
        if err.is_session_lost() {
            return AppError::SessionExpired {
                message: err.to_string(),
                redirect: login_path.to_string(),
            };
        }

        match err {
            AuthError::InvalidCredentials(msg) => AppError::Authentication(msg),
            AuthError::Api { status, message } => AppError::Upstream { status, message },
            AuthError::Http(e) => AppError::BadGateway(e.to_string()),
            AuthError::Json(e) => AppError::BadGateway(format!("Malformed response: {}", e)),
            AuthError::InvalidUrl(e) => AppError::BadRequest(e.to_string()),
            AuthError::Config(msg) => AppError::Config(msg),
            AuthError::Unauthorized
            | AuthError::TokenRefresh { .. }
            | AuthError::RefreshFailed(_) => AppError::Internal,
        }
    }
}

/// 错误响应 DTO
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: self.code(),
                message: self.user_message(),
                request_id,
                redirect: self.redirect().map(str::to_string),
            },
        };

        // 记录错误日志
        tracing::error!(
            code = self.code(),
            message = %self,
            request_id = %error_response.error.request_id,
            "Application error"
        );

        (status, Json(error_response)).into_response()
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}
