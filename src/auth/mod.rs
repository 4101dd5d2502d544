//! 认证模块
//! 会话存储、令牌刷新合并、边缘守卫

pub mod api;
pub mod cookies;
pub mod error;
pub mod fsm;
pub mod guard;
pub mod refresh;
pub mod session;

pub use api::AuthApi;
pub use cookies::{CookieChange, CookieStore, RequestCookies};
pub use error::{AuthError, AuthResult};
pub use fsm::SessionState;
pub use guard::{edge_guard_middleware, EdgeGuard, GuardDecision};
pub use refresh::RefreshCoalescer;
pub use session::{Session, SessionContext, SessionSettings, SessionStore};
