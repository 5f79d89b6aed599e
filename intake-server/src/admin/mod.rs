//! 后台数据提供器
//!
//! 生成式 CRUD 界面通过统一的 data-provider 接口访问记录存储，
//! 不做每屏各写一套的查询逻辑。路由由员工认证守卫包裹。

mod handler;
pub mod provider;

pub use provider::{DataPage, DataProvider, ListParams};

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/admin/api/{resource}",
            get(handler::list).post(handler::create),
        )
        .route(
            "/admin/api/{resource}/{id}",
            get(handler::get_one)
                .put(handler::update)
                .delete(handler::delete),
        )
}
