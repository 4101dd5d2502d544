//! 单飞令牌刷新
//!
//! 使用同一刷新令牌的并发调用共享一次进行中的刷新请求。

use crate::{
    auth::{api::AuthApi, error::AuthError},
    models::auth::RefreshedTokens,
};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};
use tracing::debug;

pub type RefreshOutcome = Result<RefreshedTokens, Arc<AuthError>>;

type InFlight = Shared<BoxFuture<'static, RefreshOutcome>>;

pub struct RefreshCoalescer {
    api: Arc<AuthApi>,
    in_flight: Arc<Mutex<HashMap<String, InFlight>>>,
}

impl RefreshCoalescer {
    pub fn new(api: Arc<AuthApi>) -> Self {
        Self {
            api,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 刷新 `refresh_token`，同一令牌已有进行中的刷新时直接加入
    ///
    /// 刷新在独立任务中运行，完成后自行移除登记项；调用方中途放弃也不会
    /// 留下残留。
    pub async fn refresh(&self, refresh_token: &str) -> RefreshOutcome {
        let future = {
            let mut in_flight = self.in_flight.lock();
            match in_flight.get(refresh_token) {
                Some(existing) => {
                    debug!("Joining in-flight token refresh");
                    existing.clone()
                }
                None => {
                    let future = self.spawn_refresh(refresh_token);
                    in_flight.insert(refresh_token.to_string(), future.clone());
                    future
                }
            }
        };

        future.await
    }

    /// 必须在持有登记表锁时调用，保证任务的移除发生在插入之后
    fn spawn_refresh(&self, refresh_token: &str) -> InFlight {
        let api = self.api.clone();
        let registry = self.in_flight.clone();
        let token = refresh_token.to_string();

        let task = tokio::spawn(async move {
            let outcome = api.refresh(&token).await.map_err(Arc::new);
            registry.lock().remove(&token);
            outcome
        });

        async move {
            task.await.unwrap_or_else(|e| {
                Err(Arc::new(AuthError::Config(format!(
                    "Token refresh task failed: {}",
                    e
                ))))
            })
        }
        .boxed()
        .shared()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().len()
    }
}
