//! Cookie 存储抽象
//!
//! 会话保存在浏览器 cookie 中。服务端为每个请求创建 [`RequestCookies`]，
//! 由请求头 `Cookie` 初始化，所有修改都会被记录并回写为 `Set-Cookie`。

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

/// 会话层使用的 cookie 存储接口
pub trait CookieStore: Send + Sync {
    /// 读取 cookie，空值视为不存在
    fn get(&self, name: &str) -> Option<String>;

    fn set(&self, name: &str, value: &str, max_age: Duration);

    fn remove(&self, name: &str);
}

/// 需要回写到响应的 cookie 变更
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieChange {
    Set { name: String, value: String, max_age: Duration },
    Remove { name: String },
}

/// 单个请求的 cookie 集合及变更日志
#[derive(Debug, Default)]
pub struct RequestCookies {
    values: Mutex<HashMap<String, String>>,
    changes: Mutex<Vec<CookieChange>>,
}

impl RequestCookies {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用浏览器发送的 cookie 初始化
    pub fn from_jar(jar: &CookieJar) -> Self {
        let values = jar
            .iter()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();

        Self {
            values: Mutex::new(values),
            changes: Mutex::new(Vec::new()),
        }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Self {
            values: Mutex::new(values),
            changes: Mutex::new(Vec::new()),
        }
    }

    pub fn changes(&self) -> Vec<CookieChange> {
        self.changes.lock().clone()
    }

    /// 把记录的变更回放到响应 jar
    pub fn apply(&self, mut jar: CookieJar, secure: bool) -> CookieJar {
        for change in self.changes.lock().drain(..) {
            match change {
                CookieChange::Set { name, value, max_age } => {
                    let max_age = time::Duration::seconds(max_age.as_secs() as i64);
                    jar = jar.add(
                        Cookie::build((name, value))
                            .path("/")
                            .http_only(true)
                            .secure(secure)
                            .same_site(SameSite::Lax)
                            .max_age(max_age),
                    );
                }
                CookieChange::Remove { name } => {
                    jar = jar.remove(Cookie::build((name, "")).path("/"));
                }
            }
        }
        jar
    }
}

impl CookieStore for RequestCookies {
    fn get(&self, name: &str) -> Option<String> {
        self.values
            .lock()
            .get(name)
            .filter(|v| !v.is_empty())
            .cloned()
    }

    fn set(&self, name: &str, value: &str, max_age: Duration) {
        self.values.lock().insert(name.to_string(), value.to_string());
        self.changes.lock().push(CookieChange::Set {
            name: name.to_string(),
            value: value.to_string(),
            max_age,
        });
    }

    fn remove(&self, name: &str) {
        self.values.lock().remove(name);
        self.changes.lock().push(CookieChange::Remove {
            name: name.to_string(),
        });
    }
}
