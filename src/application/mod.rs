//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（GenerationService、PromptStore、ProjectRepository、FileDecoder）
//! - analysis: 蓝图分析编排（失败时退化为占位蓝图）
//! - commands: CQRS 命令及处理器（导入）
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod analysis;
pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use analysis::{AnalysisConfig, AnalysisFailure, AnalysisOrchestrator, AnalysisOutcome};

pub use commands::{
    handlers::{ImportNovelHandler, ImportNovelResponse},
    ImportNovel,
};

pub use error::ApplicationError;

pub use ports::{
    // File decoder
    DecodeError,
    FileDecoderPort,
    // Generation service
    ChatMessage,
    ChatRole,
    GenerationError,
    GenerationRequest,
    GenerationServicePort,
    // Prompt store
    PromptStorePort,
    // Repositories
    ChapterContentRecord,
    ChapterRecord,
    ChapterVersionDraft,
    ChapterVersionRecord,
    ProjectImport,
    ProjectRecord,
    ProjectRepositoryPort,
    ProjectStatus,
    RepositoryError,
};

pub use queries::{
    handlers::{
        ChapterContent, GetProjectChaptersHandler, GetProjectHandler, ListProjectsHandler,
        ProjectDetail, ProjectSummary,
    },
    GetProject, GetProjectChapters, ListProjects,
};
