//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping               GET   健康检查
//! - /api/project/import     POST  导入小说文件（multipart）
//! - /api/project/list       GET   列出所有项目
//! - /api/project/get        POST  获取项目详情及蓝图
//! - /api/project/chapters   POST  获取项目章节

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/project", project_routes())
}

/// Project 路由
fn project_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/import", post(handlers::import_project))
        .route("/list", get(handlers::list_projects))
        .route("/get", post(handlers::get_project))
        .route("/chapters", post(handlers::get_project_chapters))
}
