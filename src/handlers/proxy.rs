//! 管理后台到远程 API 的认证透传

use crate::{
    auth::AuthResult,
    client::{endpoint_url, ApiRequest},
    error::AppError,
    middleware::RequestSession,
};
use axum::{
    body::Bytes,
    extract::Path,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderMap, Method, Uri,
    },
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

const API_ROOT: &str = "/api/";

/// 携带会话令牌把 `/admin/api/{path}` 转发到 `/api/{path}`
pub async fn forward(
    session: RequestSession,
    jar: CookieJar,
    Path(rest): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = match api_path(&rest) {
        Ok(path) => path,
        Err(e) => return e.into_response(),
    };

    let mut request = ApiRequest::new(method, path)
        .with_query(uri.query())
        .with_body(body);

    for name in [CONTENT_TYPE, ACCEPT] {
        if let Some(value) = headers.get(&name) {
            request = request.with_header(name, value.clone());
        }
    }

    // 令牌只能发往 /api/ 之下
    if let Err(e) = ensure_within_api(session.api_base_url(), &request) {
        return e.into_response();
    }

    let result = relay(&session, request).await;
    session.reply(jar, result)
}

/// 把透传路径映射到 `/api/` 之下，拒绝任何可能跳出该目录的段
fn api_path(rest: &str) -> Result<String, AppError> {
    let rest = rest.trim_start_matches('/');

    let escapes = rest.contains('\\')
        || rest.split('/').any(|segment| {
            let segment = segment.to_ascii_lowercase().replace("%2e", ".");
            segment == "." || segment == ".."
        });
    if escapes {
        return Err(AppError::BadRequest(format!("Invalid API path: {}", rest)));
    }

    Ok(format!("{}{}", API_ROOT, rest))
}

fn ensure_within_api(base_url: &str, request: &ApiRequest) -> Result<(), AppError> {
    let root = endpoint_url(base_url, API_ROOT).map_err(|e| AppError::Config(e.to_string()))?;
    let target = request
        .url(base_url)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if target.origin() == root.origin() && target.path().starts_with(root.path()) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Invalid API path: {}",
            request.path
        )))
    }
}

async fn relay(session: &RequestSession, request: ApiRequest) -> AuthResult<Response> {
    let upstream = session.client().send(request).await?;

    let status = upstream.status();
    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();
    let body = upstream.bytes().await?;

    let mut response = (status, body).into_response();
    if let Some(content_type) = content_type {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_path_maps_below_api_root() {
        assert_eq!(api_path("vehiculos/5/").unwrap(), "/api/vehiculos/5/");
        assert_eq!(api_path("parametros/marcas/").unwrap(), "/api/parametros/marcas/");
    }

    #[test]
    fn test_api_path_rejects_dot_segments() {
        for rest in [
            "../internal/secret/",
            "vehiculos/../../admin/",
            "./vehiculos/",
            "%2e%2E/internal/",
            ".%2e/internal/",
            "vehiculos\\..\\internal",
        ] {
            assert!(
                matches!(api_path(rest), Err(AppError::BadRequest(_))),
                "{} should be rejected",
                rest
            );
        }
    }

    #[test]
    fn test_dotted_names_are_not_segments() {
        assert_eq!(api_path("archivos/foto.v2.jpg").unwrap(), "/api/archivos/foto.v2.jpg");
    }

    #[test]
    fn test_ensure_within_api() {
        let inside = ApiRequest::get("/api/vehiculos/");
        assert!(ensure_within_api("http://backend:8000/v2", &inside).is_ok());

        let outside = ApiRequest::get("/api/../internal/");
        assert!(ensure_within_api("http://backend:8000/v2", &outside).is_err());
    }
}
