//! 远程 REST API 的认证 HTTP 客户端
//!
//! 会话持有访问令牌时，每个请求都带 `Authorization: Bearer <access>`。
//! 未重试过的请求收到 401 时刷新一次令牌（与并发调用共享）并重发一次。
//! 刷新失败则登出会话。

use crate::{
    auth::{
        error::{error_message, AuthError, AuthResult},
        fsm::SessionInput,
        refresh::RefreshCoalescer,
        session::SessionContext,
    },
    client::request::ApiRequest,
};
use reqwest::{header::AUTHORIZATION, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionContext>,
    refresher: Arc<RefreshCoalescer>,
}

impl ApiClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        session: Arc<SessionContext>,
        refresher: Arc<RefreshCoalescer>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            session,
            refresher,
        }
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// 发送请求，401 时通过刷新令牌恢复一次
    pub async fn send(&self, mut request: ApiRequest) -> AuthResult<Response> {
        let token = self.session.access_token();
        let response = self.dispatch(&request, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED || request.retried {
            return Ok(response);
        }

        request.retried = true;
        let fresh = self.recover(token.as_deref()).await?;

        debug!(method = %request.method, path = %request.path, "Retrying with refreshed token");
        self.dispatch(&request, Some(&fresh)).await
    }

    /// 发送请求并解码 2xx JSON，其他状态返回 [`AuthError::Api`]
    pub async fn json<T: DeserializeOwned>(&self, request: ApiRequest) -> AuthResult<T> {
        decode_json(self.send(request).await?).await
    }

    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> AuthResult<Response> {
        dispatch_request(&self.http, &self.base_url, request, token).await
    }

    /// `failed_token` 被拒绝后获取可用的访问令牌
    async fn recover(&self, failed_token: Option<&str>) -> AuthResult<String> {
        // a concurrent caller on this session already refreshed
        if let Some(current) = self.session.access_token() {
            if Some(current.as_str()) != failed_token {
                return Ok(current);
            }
        }

        let Some(refresh_token) = self.session.refresh_token() else {
            warn!("Request rejected with 401 and no refresh token, logging out");
            self.session.force_logout(SessionInput::Logout);
            return Err(AuthError::Unauthorized);
        };

        self.session.transition(SessionInput::Unauthorized);

        match self.refresher.refresh(&refresh_token).await {
            Ok(tokens) => {
                self.session.set_access_token(&tokens.access);
                if let Some(rotated) = &tokens.refresh {
                    self.session.set_refresh_token(rotated);
                }
                self.session.transition(SessionInput::RefreshSuccess);
                metrics::counter!("session_refresh_total", "outcome" => "success").increment(1);
                info!(rotated = tokens.refresh.is_some(), "Access token refreshed");
                Ok(tokens.access)
            }
            Err(err) => {
                warn!(error = %err, "Token refresh failed, logging out");
                self.session.force_logout(SessionInput::RefreshFailed);
                metrics::counter!("session_refresh_total", "outcome" => "failure").increment(1);
                Err(AuthError::RefreshFailed(err))
            }
        }
    }
}

/// 不带会话发送请求：不附加令牌，401 原样返回
pub async fn send_public(
    http: &Client,
    base_url: &str,
    request: &ApiRequest,
) -> AuthResult<Response> {
    dispatch_request(http, base_url, request, None).await
}

/// 解码 2xx JSON 响应体，空响应体视为 `null`
pub async fn decode_json<T: DeserializeOwned>(response: Response) -> AuthResult<T> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body, || format!("Request failed (HTTP {})", status.as_u16()));
        return Err(AuthError::Api { status, message });
    }

    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        Ok(serde_json::from_slice(b"null")?)
    } else {
        Ok(serde_json::from_slice(&bytes)?)
    }
}

async fn dispatch_request(
    http: &Client,
    base_url: &str,
    request: &ApiRequest,
    token: Option<&str>,
) -> AuthResult<Response> {
    let url = request.url(base_url)?;

    let mut headers = request.headers.clone();
    headers.remove(AUTHORIZATION);

    let mut builder = http.request(request.method.clone(), url).headers(headers);
    if let Some(token) = token {
        builder = builder.bearer_auth(token);
    }
    if let Some(body) = &request.body {
        builder = builder.body(body.clone());
    }

    Ok(builder.send().await?)
}
