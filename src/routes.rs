//! 路由注册
//! 创建所有路由并应用中间件

use axum::{
    routing::{any, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::{auth::edge_guard_middleware, handlers, middleware::AppState};

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    let guard = &state.config.guard;
    let admin = guard.protected_prefix.trim_end_matches('/');

    // 公开端点（健康检查、咨询表单）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/contact", post(handlers::inquiry::submit));

    // 登录页与登出不受边缘守卫拦截
    let auth_routes = Router::new()
        .route(
            &guard.login_path,
            get(handlers::auth::login_page).post(handlers::auth::login),
        )
        .route(state.guard.logout_path(), post(handlers::auth::logout));

    // 管理后台
    let admin_routes = Router::new()
        .route(&format!("{}/dashboard", admin), get(handlers::dashboard::summary))
        .route(&format!("{}/api/{{*path}}", admin), any(handlers::proxy::forward));

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(admin_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.guard.clone(),
            edge_guard_middleware,
        ))
        .layer(RequestBodyLimitLayer::new(state.config.server.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}
