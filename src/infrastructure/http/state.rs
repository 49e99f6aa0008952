//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    AnalysisOrchestrator, FileDecoderPort, GetProjectChaptersHandler, GetProjectHandler,
    ImportNovelHandler, ListProjectsHandler, ProjectRepositoryPort,
};

/// 应用状态
pub struct AppState {
    // ========== Command Handlers ==========
    pub import_novel_handler: ImportNovelHandler,

    // ========== Query Handlers ==========
    pub get_project_handler: GetProjectHandler,
    pub list_projects_handler: ListProjectsHandler,
    pub get_project_chapters_handler: GetProjectChaptersHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        decoder: Arc<dyn FileDecoderPort>,
        orchestrator: Arc<AnalysisOrchestrator>,
        project_repo: Arc<dyn ProjectRepositoryPort>,
    ) -> Self {
        Self {
            import_novel_handler: ImportNovelHandler::new(
                decoder,
                orchestrator,
                project_repo.clone(),
            ),
            get_project_handler: GetProjectHandler::new(project_repo.clone()),
            list_projects_handler: ListProjectsHandler::new(project_repo.clone()),
            get_project_chapters_handler: GetProjectChaptersHandler::new(project_repo),
        }
    }
}
