//! Domain Layer - 领域层
//!
//! - Novel Context: 章节、蓝图、章节大纲
//! - 分章器: 按章节标题切分全文
//! - Analysis: 模型输出清洗、蓝图标准化、大纲对账

pub mod analysis;
pub mod novel;

mod chapter_segmenter;

pub use chapter_segmenter::{segment_chapters, segment_or_whole, PROLOGUE_TITLE, WHOLE_TEXT_TITLE};
