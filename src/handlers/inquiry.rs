//! 公开咨询表单

use crate::{
    auth::AuthResult,
    client::{decode_json, send_public, ApiRequest},
    error::AppError,
    middleware::AppState,
    models::resource::ApiResource,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::sync::Arc;

/// 把访客咨询转发到远程 API，不使用管理会话，
/// 不读写访客 cookie，也不刷新令牌
pub async fn submit(State(state): State<Arc<AppState>>, Json(inquiry): Json<Value>) -> Response {
    match forward_inquiry(&state, &inquiry).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => AppError::from_auth(e, &state.config.guard.login_path).into_response(),
    }
}

async fn forward_inquiry(state: &AppState, inquiry: &Value) -> AuthResult<Value> {
    let request = ApiRequest::post_json(ApiResource::Inquiries.collection_path(), inquiry)?;
    let response = send_public(&state.http, &state.config.api.base_url, &request).await?;
    decode_json(response).await
}
