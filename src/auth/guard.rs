//! 边缘守卫
//!
//! 在受保护处理器之前运行，没有访问令牌 cookie 的请求会被重定向到登录页。
//! 只检查是否存在，令牌有效性交给远程 API 判断。

use crate::config::AppConfig;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use url::form_urlencoded;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

#[derive(Debug, Clone)]
pub struct EdgeGuard {
    protected_prefix: String,
    login_path: String,
    logout_path: String,
    access_cookie: String,
    return_param: String,
}

impl EdgeGuard {
    pub fn new(
        protected_prefix: impl Into<String>,
        login_path: impl Into<String>,
        access_cookie: impl Into<String>,
        return_param: impl Into<String>,
    ) -> Self {
        let protected_prefix: String = protected_prefix.into();
        let protected_prefix = protected_prefix.trim_end_matches('/').to_string();
        Self {
            logout_path: format!("{}/logout", protected_prefix),
            protected_prefix,
            login_path: login_path.into(),
            access_cookie: access_cookie.into(),
            return_param: return_param.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.guard.protected_prefix,
            &config.guard.login_path,
            &config.session.access_cookie,
            &config.guard.return_param,
        )
    }

    /// 受保护前缀本身及其下路径为 true，登录页与登出除外
    pub fn applies_to(&self, path: &str) -> bool {
        let trimmed = path.trim_end_matches('/');
        // 登出必须在只剩刷新令牌时也能清除 cookie
        if trimmed == self.login_path.trim_end_matches('/') || trimmed == self.logout_path {
            return false;
        }

        let prefix = self.protected_prefix.as_str();
        if prefix.is_empty() {
            return true;
        }

        match path.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    pub fn check(&self, path: &str, jar: &CookieJar) -> GuardDecision {
        if !self.applies_to(path) {
            return GuardDecision::Allow;
        }

        let has_token = jar
            .get(&self.access_cookie)
            .is_some_and(|c| !c.value().is_empty());

        if has_token {
            GuardDecision::Allow
        } else {
            GuardDecision::Redirect(self.login_redirect(path))
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn logout_path(&self) -> &str {
        &self.logout_path
    }

    pub fn return_param(&self) -> &str {
        &self.return_param
    }

    /// 没有可用返回路径时的登录后默认页
    pub fn landing_path(&self) -> String {
        format!("{}/dashboard", self.protected_prefix)
    }

    /// 登录后的跳转目标，只接受受保护区域内的
    /// 本地路径
    pub fn return_target(&self, from: Option<&str>) -> String {
        match from {
            Some(path)
                if path.starts_with('/')
                    && !path.starts_with("//")
                    && self.applies_to(path.split(['?', '#']).next().unwrap_or(path)) =>
            {
                path.to_string()
            }
            _ => self.landing_path(),
        }
    }

    /// 带原始请求路径的登录页 URL
    pub fn login_redirect(&self, from: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(&self.return_param, from)
            .finish();
        format!("{}?{}", self.login_path, query)
    }
}

/// 边缘守卫中间件
pub async fn edge_guard_middleware(
    State(guard): State<Arc<EdgeGuard>>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    match guard.check(&path, &jar) {
        GuardDecision::Allow => next.run(req).await,
        GuardDecision::Redirect(location) => {
            metrics::counter!("edge_guard_redirects_total").increment(1);
            tracing::info!(path = %path, "No session cookie, redirecting to login");
            Redirect::temporary(&location).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap};

    fn guard() -> EdgeGuard {
        EdgeGuard::new("/admin", "/admin/login", "admin_access_token", "from")
    }

    fn jar(cookie: Option<&str>) -> CookieJar {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = cookie {
            headers.insert(header::COOKIE, cookie.parse().unwrap());
        }
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn test_applies_to_prefix_on_segment_boundary() {
        let guard = guard();
        assert!(guard.applies_to("/admin"));
        assert!(guard.applies_to("/admin/"));
        assert!(guard.applies_to("/admin/vehiculos/5"));
        assert!(!guard.applies_to("/administrator"));
        assert!(!guard.applies_to("/"));
        assert!(!guard.applies_to("/vehiculos"));
    }

    #[test]
    fn test_login_page_is_never_guarded() {
        let guard = guard();
        assert!(!guard.applies_to("/admin/login"));
        assert!(!guard.applies_to("/admin/login/"));
        assert_eq!(guard.check("/admin/login", &jar(None)), GuardDecision::Allow);
    }

    #[test]
    fn test_logout_is_never_guarded() {
        let guard = guard();
        assert_eq!(guard.logout_path(), "/admin/logout");
        assert!(!guard.applies_to("/admin/logout"));
        assert_eq!(
            guard.check("/admin/logout", &jar(Some("admin_refresh_token=r1"))),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_missing_cookie_redirects_with_from() {
        let decision = guard().check("/admin/reuniones", &jar(None));
        assert_eq!(
            decision,
            GuardDecision::Redirect("/admin/login?from=%2Fadmin%2Freuniones".to_string())
        );
    }

    #[test]
    fn test_empty_cookie_redirects() {
        let decision = guard().check("/admin", &jar(Some("admin_access_token=")));
        assert!(matches!(decision, GuardDecision::Redirect(_)));
    }

    #[test]
    fn test_present_cookie_passes_regardless_of_validity() {
        let decision = guard().check(
            "/admin/vehiculos",
            &jar(Some("admin_access_token=expired-or-garbage")),
        );
        assert_eq!(decision, GuardDecision::Allow);
    }

    #[test]
    fn test_refresh_cookie_alone_does_not_pass() {
        let decision = guard().check("/admin", &jar(Some("admin_refresh_token=r1")));
        assert!(matches!(decision, GuardDecision::Redirect(_)));
    }

    #[test]
    fn test_public_paths_pass_without_cookie() {
        assert_eq!(guard().check("/contact", &jar(None)), GuardDecision::Allow);
    }

    #[test]
    fn test_return_target_keeps_local_admin_paths() {
        let guard = guard();
        assert_eq!(
            guard.return_target(Some("/admin/reuniones?page=2")),
            "/admin/reuniones?page=2"
        );
        assert_eq!(guard.return_target(None), "/admin/dashboard");
    }

    #[test]
    fn test_return_target_rejects_foreign_destinations() {
        let guard = guard();
        assert_eq!(guard.return_target(Some("//evil.example/admin")), "/admin/dashboard");
        assert_eq!(guard.return_target(Some("https://evil.example")), "/admin/dashboard");
        assert_eq!(guard.return_target(Some("/contact")), "/admin/dashboard");
        assert_eq!(guard.return_target(Some("/admin/login")), "/admin/dashboard");
    }
}
