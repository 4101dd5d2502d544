//! 健康检查处理器
//! 提供 /health 和 /ready 端点

use axum::{extract::State, Json};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::middleware::AppState;

/// 存活探针响应
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// 就绪探针响应
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: Vec<HealthCheck>,
}

/// 健康检查项
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

/// 记录应用启动时间
pub fn set_start_time() {
    Lazy::force(&START_TIME);
}

/// 获取应用运行时间（秒）
pub fn get_uptime() -> u64 {
    START_TIME.elapsed().as_secs()
}

/// 存活探针
/// 快速响应，不检查依赖
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: get_uptime(),
    })
}

/// 就绪探针
/// 远程 API 有任何 HTTP 响应即视为可达
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> Json<ReadinessResponse> {
    let ping = state.http.get(&state.config.api.base_url).send().await;

    let check = match ping {
        Ok(response) => HealthCheck {
            name: "remote_api".to_string(),
            status: "healthy".to_string(),
            message: Some(format!("HTTP {}", response.status().as_u16())),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Remote API readiness check failed");
            HealthCheck {
                name: "remote_api".to_string(),
                status: "unhealthy".to_string(),
                message: Some("unreachable".to_string()),
            }
        }
    };

    let checks = vec![check];
    let all_healthy = checks.iter().all(|c| c.status == "healthy");

    Json(ReadinessResponse {
        ready: all_healthy,
        checks,
    })
}
