//! 测试公共模块
//! 提供测试辅助函数和测试工具

#![allow(dead_code)]

use axum::{body::Body, http::header, response::Response, Router};
use dealer_admin::{
    config::{ApiConfig, AppConfig, GuardConfig, LoggingConfig, ServerConfig, SessionConfig},
    middleware::AppState,
    routes,
};
use http_body_util::BodyExt;
use std::sync::Arc;
use wiremock::MockServer;

/// 创建测试配置，远程 API 指向 `base_url`
pub fn create_test_config(base_url: &str) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(), // 使用随机端口
            graceful_shutdown_timeout_secs: 5,
            max_body_bytes: 64 * 1024,
        },
        api: ApiConfig {
            base_url: base_url.to_string(),
            login_path: "/api/auth/login/".to_string(),
            refresh_path: "/api/auth/refresh/".to_string(),
            timeout_secs: Some(5),
        },
        session: SessionConfig {
            access_cookie: "admin_access_token".to_string(),
            refresh_cookie: "admin_refresh_token".to_string(),
            access_ttl_secs: 86_400,
            refresh_ttl_secs: 604_800,
            secure_cookies: false,
        },
        guard: GuardConfig {
            protected_prefix: "/admin".to_string(),
            login_path: "/admin/login".to_string(),
            return_param: "from".to_string(),
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
    }
}

/// 创建测试应用
pub fn create_test_app(server: &MockServer) -> Router {
    let config = create_test_config(&server.uri());
    let state = Arc::new(AppState::new(config).expect("Failed to build app state"));
    routes::create_router(state)
}

/// All `Set-Cookie` header values of a response
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// The `Set-Cookie` value for `name`, if any
pub fn set_cookie(response: &Response<Body>, name: &str) -> Option<String> {
    set_cookies(response)
        .into_iter()
        .find(|c| c.starts_with(&format!("{}=", name)))
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
