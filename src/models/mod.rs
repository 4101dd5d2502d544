//! 数据模型模块
//! 认证载荷与远程资源目录

pub mod auth;
pub mod resource;
