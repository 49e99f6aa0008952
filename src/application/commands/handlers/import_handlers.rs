//! Import Command Handlers
//!
//! 导入流程：解码 → 分章 → 分析 → 对账 → 写入项目、蓝图和章节

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::application::analysis::{AnalysisFailure, AnalysisOrchestrator};
use crate::application::commands::ImportNovel;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChapterVersionDraft, FileDecoderPort, ProjectImport, ProjectRepositoryPort,
};
use crate::domain::analysis::reconcile_blueprint;
use crate::domain::novel::{Blueprint, Chapter};
use crate::domain::segment_or_whole;

/// 无法从蓝图或文件名得到标题时使用
pub const UNTITLED: &str = "未命名";

/// 导入版本的来源标记
pub const IMPORT_SOURCE: &str = "file_import";

/// 导入响应
#[derive(Debug, Clone)]
pub struct ImportNovelResponse {
    pub project_id: Uuid,
    pub title: String,
    pub chapter_count: usize,
    /// 分析失败时的原因（此时蓝图为占位蓝图）
    pub analysis_failure: Option<AnalysisFailure>,
}

/// ImportNovel Handler
pub struct ImportNovelHandler {
    decoder: Arc<dyn FileDecoderPort>,
    orchestrator: Arc<AnalysisOrchestrator>,
    project_repo: Arc<dyn ProjectRepositoryPort>,
}

impl ImportNovelHandler {
    pub fn new(
        decoder: Arc<dyn FileDecoderPort>,
        orchestrator: Arc<AnalysisOrchestrator>,
        project_repo: Arc<dyn ProjectRepositoryPort>,
    ) -> Self {
        Self {
            decoder,
            orchestrator,
            project_repo,
        }
    }

    /// 执行导入
    ///
    /// 只有编码错误、空文档和存储失败会中止导入；分析失败会退化为占位蓝图。
    /// 项目、蓝图和章节一次性写入，存储失败时不留下任何记录
    pub async fn handle(&self, command: ImportNovel) -> Result<ImportNovelResponse, ApplicationError> {
        let content = self.decoder.decode(&command.bytes)?;
        if content.trim().is_empty() {
            return Err(ApplicationError::EmptyDocument);
        }

        let chapters = segment_or_whole(&content);
        tracing::info!(
            filename = %command.filename,
            chars = content.chars().count(),
            chapters = chapters.len(),
            "Document segmented"
        );

        let outcome = self.orchestrator.analyze(&chapters, command.user_id).await;
        let blueprint = reconcile_blueprint(&chapters, outcome.blueprint);

        let title = project_title(&blueprint, &command.filename);
        let initial_prompt = format!("导入自文件: {}", command.filename);
        let versions = chapters.iter().map(import_version).collect();
        let project = self
            .project_repo
            .import_project(ProjectImport {
                user_id: command.user_id,
                title: title.clone(),
                initial_prompt,
                blueprint,
                chapters: versions,
            })
            .await?;

        tracing::info!(
            project_id = %project.id,
            title = %title,
            chapters = chapters.len(),
            analysis = outcome.failure.as_ref().map(|f| f.kind()).unwrap_or("ok"),
            "Novel imported"
        );

        Ok(ImportNovelResponse {
            project_id: project.id,
            title,
            chapter_count: chapters.len(),
            analysis_failure: outcome.failure,
        })
    }
}

/// 章节正文作为导入版本
fn import_version(chapter: &Chapter) -> ChapterVersionDraft {
    ChapterVersionDraft {
        content: chapter.body().to_string(),
        metadata: json!({ "source": IMPORT_SOURCE }),
    }
}

/// 蓝图标题优先，其次文件名（去扩展名）
fn project_title(blueprint: &Blueprint, filename: &str) -> String {
    let title = blueprint.title.trim();
    if !title.is_empty() {
        return title.to_string();
    }

    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNTITLED)
        .to_string()
}
