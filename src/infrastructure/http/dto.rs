//! Data Transfer Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 按项目 ID 查询的请求体
#[derive(Debug, Deserialize)]
pub struct ProjectIdRequest {
    pub id: Uuid,
}
