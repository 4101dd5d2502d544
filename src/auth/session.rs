//! 会话上下文与会话存储
//!
//! [`SessionContext`] 是交给 HTTP 客户端的显式会话对象，持有 cookie 存储、
//! 状态机和待执行的跳转。[`SessionStore`] 在其上实现 login / logout / is_authenticated。

use crate::{
    auth::{
        api::AuthApi,
        cookies::CookieStore,
        error::AuthResult,
        fsm::{SessionInput, SessionMachine, SessionState},
    },
    config::AppConfig,
    models::auth::Credentials,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

/// cookie 名称、有效期和登录页地址
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub access_cookie: String,
    pub refresh_cookie: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub login_path: String,
}

impl SessionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            access_cookie: config.session.access_cookie.clone(),
            refresh_cookie: config.session.refresh_cookie.clone(),
            access_ttl: config.session.access_ttl(),
            refresh_ttl: config.session.refresh_ttl(),
            login_path: config.guard.login_path.clone(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            access_cookie: "admin_access_token".to_string(),
            refresh_cookie: "admin_refresh_token".to_string(),
            access_ttl: Duration::from_secs(86400),
            refresh_ttl: Duration::from_secs(7 * 86400),
            login_path: "/admin/login".to_string(),
        }
    }
}

/// 写入 cookie 的令牌及其过期时间
#[derive(Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("access_expires_at", &self.access_expires_at)
            .field("refresh_expires_at", &self.refresh_expires_at)
            .finish()
    }
}

pub struct SessionContext {
    cookies: Arc<dyn CookieStore>,
    settings: SessionSettings,
    fsm: Mutex<SessionMachine>,
    redirect: Mutex<Option<String>>,
}

impl SessionContext {
    pub fn new(cookies: Arc<dyn CookieStore>, settings: SessionSettings) -> Self {
        let mut machine = SessionMachine::new();
        if cookies.get(&settings.access_cookie).is_some() {
            // Anonymous -> Authenticated is always permitted
            let _ = machine.consume(&SessionInput::SessionDetected);
        }

        Self {
            cookies,
            settings,
            fsm: Mutex::new(machine),
            redirect: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn access_token(&self) -> Option<String> {
        self.cookies.get(&self.settings.access_cookie)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.cookies.get(&self.settings.refresh_cookie)
    }

    pub fn state(&self) -> SessionState {
        SessionState::from(self.fsm.lock().state())
    }

    /// 驱动状态机，不可能的转换保持原状态
    pub(crate) fn transition(&self, input: SessionInput) -> SessionState {
        let mut fsm = self.fsm.lock();
        let old_state = SessionState::from(fsm.state());

        if fsm.consume(&input).is_err() {
            debug!(state = ?old_state, input = ?input, "Ignoring impossible session transition");
            return old_state;
        }

        let new_state = SessionState::from(fsm.state());
        if old_state != new_state {
            debug!(old_state = ?old_state, new_state = ?new_state, "Session state transition");
        }
        new_state
    }

    /// 写入新的令牌对并返回会话
    pub(crate) fn store_tokens(&self, access: &str, refresh: &str) -> Session {
        let now = Utc::now();
        self.set_access_token(access);
        self.cookies
            .set(&self.settings.refresh_cookie, refresh, self.settings.refresh_ttl);

        Session {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
            access_expires_at: now + chrono_duration(self.settings.access_ttl),
            refresh_expires_at: now + chrono_duration(self.settings.refresh_ttl),
        }
    }

    pub(crate) fn set_access_token(&self, access: &str) {
        self.cookies
            .set(&self.settings.access_cookie, access, self.settings.access_ttl);
    }

    pub(crate) fn set_refresh_token(&self, refresh: &str) {
        self.cookies
            .set(&self.settings.refresh_cookie, refresh, self.settings.refresh_ttl);
    }

    /// 清除两个 cookie 并请求跳转到登录页
    pub(crate) fn force_logout(&self, input: SessionInput) {
        self.cookies.remove(&self.settings.access_cookie);
        self.cookies.remove(&self.settings.refresh_cookie);
        self.transition(input);
        *self.redirect.lock() = Some(self.settings.login_path.clone());
    }

    /// 登出请求的跳转（如果有）
    pub fn pending_redirect(&self) -> Option<String> {
        self.redirect.lock().clone()
    }
}

fn chrono_duration(d: Duration) -> chrono::Duration {
    chrono::Duration::seconds(d.as_secs() as i64)
}

/// 基于 [`SessionContext`] 的 login / logout / is_authenticated
#[derive(Clone)]
pub struct SessionStore {
    api: Arc<AuthApi>,
    context: Arc<SessionContext>,
}

impl SessionStore {
    pub fn new(api: Arc<AuthApi>, context: Arc<SessionContext>) -> Self {
        Self { api, context }
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    /// 向远程 API 认证并保存两个令牌
    ///
    /// 远程 API 拒绝凭据时不写入任何
    /// cookie
    pub async fn login(&self, credentials: &Credentials) -> AuthResult<Session> {
        let tokens = self.api.login(credentials).await?;

        let session = self.context.store_tokens(&tokens.access, &tokens.refresh);
        self.context.transition(SessionInput::LoginSuccess);

        info!(email = %credentials.email, "Login successful");
        Ok(session)
    }

    /// 清除两个 cookie 并请求跳转到登录页
    pub fn logout(&self) {
        self.context.force_logout(SessionInput::Logout);
        info!("Logged out");
    }

    /// 只检查访问令牌 cookie 是否存在
    pub fn is_authenticated(&self) -> bool {
        self.context.access_token().is_some()
    }
}
