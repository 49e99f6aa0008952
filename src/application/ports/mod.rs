//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod file_decoder;
mod generation_service;
mod prompt_store;
mod repositories;

pub use file_decoder::{DecodeError, FileDecoderPort};
pub use generation_service::{
    ChatMessage, ChatRole, GenerationError, GenerationRequest, GenerationServicePort,
};
pub use prompt_store::PromptStorePort;
pub use repositories::{
    ChapterContentRecord, ChapterRecord, ChapterVersionDraft, ChapterVersionRecord,
    ProjectImport, ProjectRecord, ProjectRepositoryPort, ProjectStatus, RepositoryError,
};
