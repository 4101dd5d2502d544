//! 远程 REST API 客户端

pub mod api_client;
pub mod request;
pub mod resources;

pub use api_client::{decode_json, send_public, ApiClient};
pub use request::{endpoint_url, ApiRequest};
pub use resources::item_count;
