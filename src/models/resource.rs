//! 远程 API 资源目录
//!
//! 载荷对本服务不透明，这里只知道路径。

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResource {
    /// 车辆库存
    Vehicles,
    /// 买家预约
    Meetings,
    /// 卖家联系人
    Sellers,
    /// 参数表，例如 `Parameters("marcas")`
    Parameters(String),
    /// 客户咨询
    Inquiries,
    /// 已发布的列表
    Publications,
}

impl ApiResource {
    /// 集合路径，总是以斜杠结尾
    pub fn collection_path(&self) -> String {
        match self {
            ApiResource::Vehicles => "/api/vehiculos/".to_string(),
            ApiResource::Meetings => "/api/reuniones/".to_string(),
            ApiResource::Sellers => "/api/vendedores/".to_string(),
            ApiResource::Parameters(kind) => {
                format!("/api/parametros/{}/", kind.trim_matches('/'))
            }
            ApiResource::Inquiries => "/api/consultas/".to_string(),
            ApiResource::Publications => "/api/publicaciones/".to_string(),
        }
    }

    pub fn item_path(&self, id: impl fmt::Display) -> String {
        format!("{}{}/", self.collection_path(), id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_paths() {
        assert_eq!(ApiResource::Vehicles.collection_path(), "/api/vehiculos/");
        assert_eq!(ApiResource::Meetings.collection_path(), "/api/reuniones/");
        assert_eq!(ApiResource::Sellers.collection_path(), "/api/vendedores/");
        assert_eq!(ApiResource::Inquiries.collection_path(), "/api/consultas/");
        assert_eq!(ApiResource::Publications.collection_path(), "/api/publicaciones/");
        assert_eq!(
            ApiResource::Parameters("/marcas/".to_string()).collection_path(),
            "/api/parametros/marcas/"
        );
    }

    #[test]
    fn test_item_path() {
        assert_eq!(ApiResource::Vehicles.item_path(5), "/api/vehiculos/5/");
    }
}
