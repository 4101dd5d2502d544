//! HTTP 中间件
//! 应用状态、请求会话提取、请求追踪

use crate::{
    auth::{
        AuthApi, AuthResult, EdgeGuard, RefreshCoalescer, RequestCookies, SessionContext,
        SessionSettings, SessionStore,
    },
    client::ApiClient,
    config::AppConfig,
    error::AppError,
};
use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use reqwest::Client;
use std::{convert::Infallible, sync::Arc, time::Duration, time::Instant};
use tracing::Instrument;
use uuid::Uuid;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// 应用状态
///
/// 跨请求共享，单个请求的会话状态在 [`RequestSession`] 中
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub http: Client,
    pub auth_api: Arc<AuthApi>,
    pub refresher: Arc<RefreshCoalescer>,
    pub guard: Arc<EdgeGuard>,
    pub session_settings: SessionSettings,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let mut builder = Client::builder().user_agent(APP_USER_AGENT);
        if let Some(secs) = config.api.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let auth_api = Arc::new(
            AuthApi::new(http.clone(), &config.api).map_err(|e| AppError::Config(e.to_string()))?,
        );

        Ok(Self {
            refresher: Arc::new(RefreshCoalescer::new(auth_api.clone())),
            guard: Arc::new(EdgeGuard::from_config(&config)),
            session_settings: SessionSettings::from_config(&config),
            auth_api,
            http,
            config,
        })
    }
}

/// 当前请求的会话，由浏览器 cookie 初始化
///
/// 处理器必须用 [`RequestSession::finish`] 处理响应 jar，
/// cookie 变更才能回到浏览器
pub struct RequestSession {
    state: Arc<AppState>,
    cookies: Arc<RequestCookies>,
    context: Arc<SessionContext>,
}

impl RequestSession {
    pub fn new(state: Arc<AppState>, jar: &CookieJar) -> Self {
        let cookies = Arc::new(RequestCookies::from_jar(jar));
        let context = Arc::new(SessionContext::new(
            cookies.clone(),
            state.session_settings.clone(),
        ));

        Self {
            state,
            cookies,
            context,
        }
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    pub fn api_base_url(&self) -> &str {
        &self.state.config.api.base_url
    }

    pub fn store(&self) -> SessionStore {
        SessionStore::new(self.state.auth_api.clone(), self.context.clone())
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(
            self.state.http.clone(),
            self.state.config.api.base_url.clone(),
            self.context.clone(),
            self.state.refresher.clone(),
        )
    }

    /// 把记录的 cookie 变更写入响应 jar
    pub fn finish(&self, jar: CookieJar) -> CookieJar {
        self.cookies
            .apply(jar, self.state.config.session.secure_cookies)
    }

    /// 构建调用远程 API 的处理器响应，失败时同样回写
    /// cookie 变更，强制登出会清除浏览器 cookie
    pub fn reply<T: IntoResponse>(&self, jar: CookieJar, result: AuthResult<T>) -> Response {
        let jar = self.finish(jar);
        match result {
            Ok(body) => (jar, body).into_response(),
            Err(e) => (jar, AppError::from_auth(e, &self.state.config.guard.login_path))
                .into_response(),
        }
    }
}

impl FromRequestParts<Arc<AppState>> for RequestSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(RequestSession::new(state.clone(), &jar))
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let uri = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    async move {
        let start = Instant::now();

        let mut response = next.run(req).await;

        let elapsed = start.elapsed();

        let status = response.status().as_u16();
        let method_name = match method.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "PUT" => "PUT",
            "DELETE" => "DELETE",
            "PATCH" => "PATCH",
            _ => "UNKNOWN",
        };
        let status_code = match status {
            200 => "200",
            201 => "201",
            204 => "204",
            303 => "303",
            307 => "307",
            400 => "400",
            401 => "401",
            403 => "403",
            404 => "404",
            500 => "500",
            502 => "502",
            _ => "other",
        };

        metrics::counter!("http_requests_total", "method" => method_name, "status" => status_code)
            .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            method = %method,
            uri = %uri,
            status = status,
            elapsed_ms = elapsed.as_millis(),
            "Request completed"
        );

        // 在响应头中添加 trace_id
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
