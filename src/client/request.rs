//! 出站请求描述
//!
//! 请求体保存为 [`Bytes`]，令牌刷新后可以再次发送。

use crate::auth::error::{AuthError, AuthResult};
use axum::body::Bytes;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE},
    Method,
};
use serde::Serialize;
use url::Url;

/// 拼接基础 URL 与 API 路径，保留基础 URL 的路径前缀
pub fn endpoint_url(base_url: &str, path: &str) -> AuthResult<Url> {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        return Err(AuthError::Config("api base URL is empty".to_string()));
    }

    Ok(Url::parse(&format!("{}/{}", base, path.trim_start_matches('/')))?)
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    /// 刷新后重发过一次即置位
    pub retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: HeaderMap::new(),
            body: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn post_json<T: Serialize + ?Sized>(path: impl Into<String>, body: &T) -> AuthResult<Self> {
        Self::new(Method::POST, path).with_json(body)
    }

    pub fn patch_json<T: Serialize + ?Sized>(path: impl Into<String>, body: &T) -> AuthResult<Self> {
        Self::new(Method::PATCH, path).with_json(body)
    }

    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> AuthResult<Self> {
        let bytes = serde_json::to_vec(body)?;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(Bytes::from(bytes));
        Ok(self)
    }

    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = if body.is_empty() { None } else { Some(body) };
        self
    }

    pub fn with_query(mut self, query: Option<&str>) -> Self {
        self.query = query.filter(|q| !q.is_empty()).map(str::to_string);
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// 相对 `base_url` 的完整 URL
    pub fn url(&self, base_url: &str) -> AuthResult<Url> {
        let mut url = endpoint_url(base_url, &self.path)?;
        if let Some(query) = &self.query {
            url.set_query(Some(query));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_url_keeps_base_path() {
        let url = endpoint_url("http://backend:8000/v2/", "/api/vehiculos/").unwrap();
        assert_eq!(url.as_str(), "http://backend:8000/v2/api/vehiculos/");
    }

    #[test]
    fn test_endpoint_url_rejects_empty_base() {
        assert!(matches!(
            endpoint_url("  ", "/api/"),
            Err(AuthError::Config(_))
        ));
    }

    #[test]
    fn test_url_with_query() {
        let request = ApiRequest::get("/api/vehiculos/").with_query(Some("page=2&marca=1"));
        let url = request.url("http://backend:8000").unwrap();
        assert_eq!(url.as_str(), "http://backend:8000/api/vehiculos/?page=2&marca=1");
    }

    #[test]
    fn test_empty_query_is_dropped() {
        let request = ApiRequest::get("/api/vehiculos/").with_query(Some(""));
        assert!(request.query.is_none());
    }

    #[test]
    fn test_post_json_sets_body_and_content_type() {
        let request = ApiRequest::post_json("/api/consultas/", &json!({"nombre": "Ana"})).unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.headers[CONTENT_TYPE], "application/json");
        assert_eq!(request.body.unwrap(), Bytes::from_static(br#"{"nombre":"Ana"}"#));
        assert!(!request.retried);
    }
}
