//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（如 SQLite）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::novel::Blueprint;

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

// ============================================================================
// Project Repository
// ============================================================================

/// 项目状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    /// 刚创建，尚未写入蓝图和章节
    Draft,
    /// 蓝图和章节已就绪
    BlueprintReady,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::BlueprintReady => "blueprint_ready",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ProjectStatus::Draft),
            "blueprint_ready" => Some(ProjectStatus::BlueprintReady),
            _ => None,
        }
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Draft
    }
}

/// 项目实体（用于持久化）
#[derive(Debug, Clone)]
pub struct ProjectRecord {
    pub id: Uuid,
    pub user_id: i64,
    pub title: String,
    pub initial_prompt: String,
    pub status: ProjectStatus,
    pub blueprint: Option<Blueprint>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 章节槽位（按位置编号）
#[derive(Debug, Clone)]
pub struct ChapterRecord {
    pub id: Uuid,
    pub project_id: Uuid,
    pub chapter_number: u32,
    pub selected_version_index: Option<usize>,
}

/// 待写入的章节版本
#[derive(Debug, Clone)]
pub struct ChapterVersionDraft {
    pub content: String,
    pub metadata: Value,
}

/// 章节版本
#[derive(Debug, Clone)]
pub struct ChapterVersionRecord {
    pub id: Uuid,
    pub chapter_id: Uuid,
    pub version_index: usize,
    pub content: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

/// 一次完整导入：项目、蓝图以及按位置排列的章节首个版本
#[derive(Debug, Clone)]
pub struct ProjectImport {
    pub user_id: i64,
    pub title: String,
    pub initial_prompt: String,
    pub blueprint: Blueprint,
    /// 第 i 个元素成为第 i+1 章的版本 0，并被选中
    pub chapters: Vec<ChapterVersionDraft>,
}

/// 章节及其当前选中的版本内容
#[derive(Debug, Clone)]
pub struct ChapterContentRecord {
    pub chapter: ChapterRecord,
    pub content: Option<String>,
}

/// Project Repository Port
#[async_trait]
pub trait ProjectRepositoryPort: Send + Sync {
    /// 创建项目（status = draft）
    async fn create_project(
        &self,
        user_id: i64,
        title: &str,
        initial_prompt: &str,
    ) -> Result<ProjectRecord, RepositoryError>;

    /// 原子地写入整个导入结果（status = blueprint_ready）
    ///
    /// 任一步失败时不留下任何项目、章节或版本
    async fn import_project(&self, import: ProjectImport) -> Result<ProjectRecord, RepositoryError>;

    /// 覆盖项目蓝图
    async fn replace_blueprint(
        &self,
        project_id: Uuid,
        blueprint: &Blueprint,
    ) -> Result<(), RepositoryError>;

    /// 按位置获取章节槽位，不存在时创建
    async fn get_or_create_chapter(
        &self,
        project_id: Uuid,
        chapter_number: u32,
    ) -> Result<ChapterRecord, RepositoryError>;

    /// 用给定版本列表替换章节的全部历史版本
    async fn replace_chapter_versions(
        &self,
        chapter_id: Uuid,
        versions: &[ChapterVersionDraft],
    ) -> Result<Vec<ChapterVersionRecord>, RepositoryError>;

    /// 选中章节的某个版本
    async fn select_chapter_version(
        &self,
        chapter_id: Uuid,
        version_index: usize,
    ) -> Result<(), RepositoryError>;

    /// 更新项目状态
    async fn update_status(
        &self,
        project_id: Uuid,
        status: ProjectStatus,
    ) -> Result<(), RepositoryError>;

    /// 根据 ID 查找项目
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProjectRecord>, RepositoryError>;

    /// 获取所有项目
    async fn find_all(&self) -> Result<Vec<ProjectRecord>, RepositoryError>;

    /// 获取项目的章节（按编号排序）及选中版本内容
    async fn find_chapters(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<ChapterContentRecord>, RepositoryError>;
}
