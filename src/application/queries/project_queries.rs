//! Project Queries

use uuid::Uuid;

/// 获取项目详情（含蓝图）
#[derive(Debug, Clone)]
pub struct GetProject {
    pub project_id: Uuid,
}

/// 列出所有项目
#[derive(Debug, Clone)]
pub struct ListProjects;

/// 获取项目章节及选中版本内容
#[derive(Debug, Clone)]
pub struct GetProjectChapters {
    pub project_id: Uuid,
}
