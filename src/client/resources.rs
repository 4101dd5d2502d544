//! 资源目录的增删改查
//! 载荷保持为不透明 JSON

use crate::{
    auth::error::AuthResult,
    client::{api_client::ApiClient, request::ApiRequest},
    models::resource::ApiResource,
};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;

impl ApiClient {
    pub async fn list(&self, resource: &ApiResource, query: Option<&str>) -> AuthResult<Value> {
        self.json(ApiRequest::get(resource.collection_path()).with_query(query))
            .await
    }

    pub async fn get(&self, resource: &ApiResource, id: impl Display) -> AuthResult<Value> {
        self.json(ApiRequest::get(resource.item_path(id))).await
    }

    pub async fn create<T: Serialize + ?Sized>(
        &self,
        resource: &ApiResource,
        body: &T,
    ) -> AuthResult<Value> {
        self.json(ApiRequest::post_json(resource.collection_path(), body)?)
            .await
    }

    pub async fn update<T: Serialize + ?Sized>(
        &self,
        resource: &ApiResource,
        id: impl Display,
        body: &T,
    ) -> AuthResult<Value> {
        self.json(ApiRequest::patch_json(resource.item_path(id), body)?)
            .await
    }

    pub async fn delete(&self, resource: &ApiResource, id: impl Display) -> AuthResult<()> {
        self.json::<Value>(ApiRequest::delete(resource.item_path(id)))
            .await
            .map(|_| ())
    }
}

/// 列表载荷的条目数：数组，或分页的 `{count, results}` 对象
pub fn item_count(payload: &Value) -> Option<u64> {
    match payload {
        Value::Array(items) => Some(items.len() as u64),
        Value::Object(map) => map.get("count").and_then(Value::as_u64).or_else(|| {
            map.get("results")
                .and_then(Value::as_array)
                .map(|r| r.len() as u64)
        }),
        _ => None,
    }
}
