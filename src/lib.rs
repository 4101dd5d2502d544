//! 经销商管理后台核心库
//! 会话存储、带自动刷新的认证 HTTP 客户端、边缘守卫

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod telemetry;
