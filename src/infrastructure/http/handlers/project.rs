//! Project HTTP Handlers

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{
    AnalysisFailure, ChapterContent, GetProject, GetProjectChapters, ImportNovel, ListProjects,
    ProjectSummary,
};
use crate::domain::novel::Blueprint;
use crate::infrastructure::http::dto::{ApiResponse, ProjectIdRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: Uuid,
    pub user_id: i64,
    pub title: String,
    pub status: String,
    pub created_at: String,
}

impl From<ProjectSummary> for ProjectResponse {
    fn from(s: ProjectSummary) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            title: s.title,
            status: s.status,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectDetailResponse {
    #[serde(flatten)]
    pub project: ProjectResponse,
    pub initial_prompt: String,
    pub blueprint: Option<Blueprint>,
}

/// 分析结果：`ok` 或 `fallback`（使用占位蓝图）
#[derive(Debug, Serialize)]
pub struct AnalysisStatusResponse {
    pub status: &'static str,
    pub kind: Option<&'static str>,
    pub error: Option<String>,
}

impl From<Option<AnalysisFailure>> for AnalysisStatusResponse {
    fn from(failure: Option<AnalysisFailure>) -> Self {
        match failure {
            None => Self {
                status: "ok",
                kind: None,
                error: None,
            },
            Some(f) => Self {
                status: "fallback",
                kind: Some(f.kind()),
                error: Some(f.to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ImportProjectResponse {
    pub id: Uuid,
    pub title: String,
    pub chapter_count: usize,
    pub analysis: AnalysisStatusResponse,
}

#[derive(Debug, Serialize)]
pub struct ChapterResponse {
    pub chapter_number: u32,
    pub selected_version_index: Option<usize>,
    pub content: String,
}

impl From<ChapterContent> for ChapterResponse {
    fn from(c: ChapterContent) -> Self {
        Self {
            chapter_number: c.chapter_number,
            selected_version_index: c.selected_version_index,
            content: c.content,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChaptersResponse {
    pub project_id: Uuid,
    pub total: usize,
    pub chapters: Vec<ChapterResponse>,
}

// ============================================================================
// Handlers
// ============================================================================

/// 导入小说 TXT 文件
///
/// multipart 字段：`file`（必填），`user_id`（可选，默认 0）。
/// 分析失败不会导致请求失败，结果中 `analysis.status` 为 `fallback`。
pub async fn import_project(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ImportProjectResponse>>, ApiError> {
    let mut user_id: i64 = 0;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "user_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read user_id: {}", e)))?;
                user_id = text
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::BadRequest(format!("Invalid user_id: {}", text)))?;
            }
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
                file = Some((filename, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let (filename, bytes) =
        file.ok_or_else(|| ApiError::BadRequest("File is required".to_string()))?;

    tracing::info!(
        user_id,
        filename = %filename,
        bytes = bytes.len(),
        "Import requested"
    );

    let result = state
        .import_novel_handler
        .handle(ImportNovel {
            user_id,
            filename,
            bytes,
        })
        .await?;

    Ok(Json(ApiResponse::success(ImportProjectResponse {
        id: result.project_id,
        title: result.title,
        chapter_count: result.chapter_count,
        analysis: result.analysis_failure.into(),
    })))
}

/// 获取项目列表
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ProjectResponse>>>, ApiError> {
    let result = state.list_projects_handler.handle(ListProjects).await?;

    let responses = result.into_iter().map(ProjectResponse::from).collect();

    Ok(Json(ApiResponse::success(responses)))
}

/// 获取项目详情（含蓝图）
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProjectIdRequest>,
) -> Result<Json<ApiResponse<ProjectDetailResponse>>, ApiError> {
    let result = state
        .get_project_handler
        .handle(GetProject { project_id: req.id })
        .await?;

    Ok(Json(ApiResponse::success(ProjectDetailResponse {
        project: result.summary.into(),
        initial_prompt: result.initial_prompt,
        blueprint: result.blueprint,
    })))
}

/// 获取项目章节（选中版本的正文）
pub async fn get_project_chapters(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProjectIdRequest>,
) -> Result<Json<ApiResponse<ChaptersResponse>>, ApiError> {
    let result = state
        .get_project_chapters_handler
        .handle(GetProjectChapters { project_id: req.id })
        .await?;

    let chapters: Vec<ChapterResponse> = result.into_iter().map(ChapterResponse::from).collect();

    Ok(Json(ApiResponse::success(ChaptersResponse {
        project_id: req.id,
        total: chapters.len(),
        chapters,
    })))
}
