//! 大纲对账
//!
//! 以实际分出的章节为准，修正模型给出的章节大纲：
//! - 结果长度总是等于章节数，编号为位置（从 1 开始）
//! - 标题总是取实际章节标题，模型只贡献摘要
//! - 模型缺失的章节补空摘要占位，越界的条目直接丢弃

use std::collections::HashMap;

use crate::domain::novel::{Blueprint, Chapter, ChapterOutlineEntry};

pub fn reconcile_outline(
    detected: &[Chapter],
    ai_outline: Vec<ChapterOutlineEntry>,
) -> Vec<ChapterOutlineEntry> {
    // 编号重复时后出现的覆盖先出现的
    let mut by_number: HashMap<u32, ChapterOutlineEntry> = ai_outline
        .into_iter()
        .map(|entry| (entry.chapter_number, entry))
        .collect();

    detected
        .iter()
        .enumerate()
        .map(|(i, chapter)| {
            let number = (i + 1) as u32;
            match by_number.remove(&number) {
                Some(entry) => ChapterOutlineEntry::new(number, chapter.title(), entry.summary),
                None => ChapterOutlineEntry::placeholder(number, chapter.title()),
            }
        })
        .collect()
}

/// 对蓝图的大纲做对账，返回满足章节不变量的蓝图
pub fn reconcile_blueprint(detected: &[Chapter], mut blueprint: Blueprint) -> Blueprint {
    let outline = std::mem::take(&mut blueprint.chapter_outline);
    blueprint.chapter_outline = reconcile_outline(detected, outline);
    blueprint
}
