//! 认证相关的 HTTP 处理器

use crate::{
    error::AppError,
    middleware::{AppState, RequestSession},
    models::auth::{Credentials, LoginResponse},
};
use axum::{
    extract::{FromRequest, Query, Request, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Redirect},
    Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use std::{collections::HashMap, sync::Arc};

/// 登录页
/// 登录表单占位，回显返回路径
pub async fn login_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let from = query.get(state.guard.return_param()).cloned();

    Json(json!({
        "page": "login",
        "action": state.guard.login_path(),
        "from": from,
    }))
}

/// 登录
/// 接受 JSON 或表单凭据
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: RequestSession,
    jar: CookieJar,
    Query(query): Query<HashMap<String, String>>,
    req: Request,
) -> Result<impl IntoResponse, AppError> {
    let credentials = read_credentials(req).await?;

    session
        .store()
        .login(&credentials)
        .await
        .map_err(|e| AppError::from_auth(e, state.guard.login_path()))?;

    let redirect = state
        .guard
        .return_target(query.get(state.guard.return_param()).map(String::as_str));

    Ok((
        session.finish(jar),
        Json(LoginResponse {
            authenticated: true,
            redirect,
        }),
    ))
}

/// 登出
pub async fn logout(
    State(state): State<Arc<AppState>>,
    session: RequestSession,
    jar: CookieJar,
) -> impl IntoResponse {
    session.store().logout();

    let target = session
        .context()
        .pending_redirect()
        .unwrap_or_else(|| state.guard.login_path().to_string());

    (session.finish(jar), Redirect::to(&target))
}

async fn read_credentials(req: Request) -> Result<Credentials, AppError> {
    let is_form = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    if is_form {
        let Form(credentials) = Form::<Credentials>::from_request(req, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(credentials)
    } else {
        let Json(credentials) = Json::<Credentials>::from_request(req, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(credentials)
    }
}
