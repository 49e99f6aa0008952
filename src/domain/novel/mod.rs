//! Novel Context - 小说限界上下文
//!
//! 职责:
//! - 章节实体（分章结果）
//! - 蓝图（叙事元数据）及章节大纲

mod blueprint;
mod entities;
mod errors;

pub use blueprint::{Blueprint, WorldSetting, STUB_SUMMARY, STUB_TITLE};
pub use entities::{Chapter, ChapterOutlineEntry};
pub use errors::BlueprintError;
