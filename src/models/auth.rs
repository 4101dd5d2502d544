//! 认证相关数据模型

use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

/// 登录表单提交的凭据
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: Secret<String>,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Secret::new(password.into()),
        }
    }

    /// 远程登录接口的请求体
    pub(crate) fn to_login_body(&self) -> serde_json::Value {
        serde_json::json!({
            "email": self.email,
            "password": self.password.expose_secret(),
        })
    }
}

/// 远程 API 的登录响应
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// 令牌刷新请求
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// 令牌刷新响应，服务端轮换时带 `refresh`
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshedTokens {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// 管理后台登录成功响应
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub authenticated: bool,
    pub redirect: String,
}
