//! 管理后台仪表盘

use crate::{
    auth::AuthResult,
    client::item_count,
    middleware::RequestSession,
    models::resource::ApiResource,
};
use axum::{response::Response, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub vehicles: Option<u64>,
    pub meetings: Option<u64>,
    pub inquiries: Option<u64>,
}

/// 并发获取主要集合的数量
pub async fn summary(session: RequestSession, jar: CookieJar) -> Response {
    let client = session.client();

    let (vehicles, meetings, inquiries) = tokio::join!(
        client.list(&ApiResource::Vehicles, None),
        client.list(&ApiResource::Meetings, None),
        client.list(&ApiResource::Inquiries, None),
    );

    let result = summarize(vehicles, meetings, inquiries).map(Json);
    session.reply(jar, result)
}

fn summarize(
    vehicles: AuthResult<Value>,
    meetings: AuthResult<Value>,
    inquiries: AuthResult<Value>,
) -> AuthResult<DashboardSummary> {
    Ok(DashboardSummary {
        vehicles: item_count(&vehicles?),
        meetings: item_count(&meetings?),
        inquiries: item_count(&inquiries?),
    })
}
