//! Folio - 小说导入服务
//!
//! 上传 TXT 小说，自动分章，调用大模型生成蓝图（标题、梗概、世界观、角色、章节大纲），
//! 并将章节正文作为导入版本写入项目。
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Novel Context: 章节与蓝图
//! - Analysis: 模型输出清洗、字段标准化、大纲对账
//! - 分章: 按章节标题切分正文
//!
//! 应用层 (application/):
//! - Ports: 端口定义（GenerationService, PromptStore, ProjectRepository, FileDecoder）
//! - Analysis: 蓝图分析编排
//! - Commands: 导入命令处理器
//! - Queries: 项目查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Persistence: SQLite 存储
//! - Adapters: LLM Client, UTF-8/GBK 解码

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
