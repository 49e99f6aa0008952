//! Project Query Handlers

use std::sync::Arc;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{ChapterContentRecord, ProjectRecord, ProjectRepositoryPort};
use crate::application::queries::{GetProject, GetProjectChapters, ListProjects};
use crate::domain::novel::Blueprint;

// ============================================================================
// Response DTOs
// ============================================================================

/// 项目摘要
#[derive(Debug, Clone)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub user_id: i64,
    pub title: String,
    pub status: String,
    pub created_at: String,
}

impl From<&ProjectRecord> for ProjectSummary {
    fn from(record: &ProjectRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            title: record.title.clone(),
            status: record.status.as_str().to_string(),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

/// 项目详情
#[derive(Debug, Clone)]
pub struct ProjectDetail {
    pub summary: ProjectSummary,
    pub initial_prompt: String,
    pub blueprint: Option<Blueprint>,
}

impl From<ProjectRecord> for ProjectDetail {
    fn from(record: ProjectRecord) -> Self {
        Self {
            summary: ProjectSummary::from(&record),
            initial_prompt: record.initial_prompt,
            blueprint: record.blueprint,
        }
    }
}

/// 章节内容
#[derive(Debug, Clone)]
pub struct ChapterContent {
    pub chapter_number: u32,
    pub selected_version_index: Option<usize>,
    pub content: String,
}

impl From<ChapterContentRecord> for ChapterContent {
    fn from(record: ChapterContentRecord) -> Self {
        Self {
            chapter_number: record.chapter.chapter_number,
            selected_version_index: record.chapter.selected_version_index,
            content: record.content.unwrap_or_default(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GetProject Handler
pub struct GetProjectHandler {
    project_repo: Arc<dyn ProjectRepositoryPort>,
}

impl GetProjectHandler {
    pub fn new(project_repo: Arc<dyn ProjectRepositoryPort>) -> Self {
        Self { project_repo }
    }

    pub async fn handle(&self, query: GetProject) -> Result<ProjectDetail, ApplicationError> {
        let project = self
            .project_repo
            .find_by_id(query.project_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Project", query.project_id))?;

        Ok(ProjectDetail::from(project))
    }
}

/// ListProjects Handler
pub struct ListProjectsHandler {
    project_repo: Arc<dyn ProjectRepositoryPort>,
}

impl ListProjectsHandler {
    pub fn new(project_repo: Arc<dyn ProjectRepositoryPort>) -> Self {
        Self { project_repo }
    }

    pub async fn handle(&self, _query: ListProjects) -> Result<Vec<ProjectSummary>, ApplicationError> {
        let projects = self.project_repo.find_all().await?;
        Ok(projects.iter().map(ProjectSummary::from).collect())
    }
}

/// GetProjectChapters Handler
pub struct GetProjectChaptersHandler {
    project_repo: Arc<dyn ProjectRepositoryPort>,
}

impl GetProjectChaptersHandler {
    pub fn new(project_repo: Arc<dyn ProjectRepositoryPort>) -> Self {
        Self { project_repo }
    }

    pub async fn handle(
        &self,
        query: GetProjectChapters,
    ) -> Result<Vec<ChapterContent>, ApplicationError> {
        // 验证项目存在
        self.project_repo
            .find_by_id(query.project_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Project", query.project_id))?;

        let chapters = self.project_repo.find_chapters(query.project_id).await?;
        Ok(chapters.into_iter().map(ChapterContent::from).collect())
    }
}
