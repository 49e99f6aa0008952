//! 章节分割器
//!
//! 按行首的章节标题把整本小说切成章节列表。支持的标题格式：
//! - 第1章 / 第一章 / 第十二卷 / 第三回 / 第五节（可带标题文字）
//! - Chapter 1（可带标题文字）
//!
//! 章节编号只取决于在结果中的位置，标题里的数字不参与排序或寻址。

use std::sync::OnceLock;

use regex::Regex;

use super::novel::Chapter;

/// 第一个标题之前的非空内容所用的章节标题
pub const PROLOGUE_TITLE: &str = "序章";

/// 找不到任何章节标题时，整篇作为一章所用的标题
pub const WHOLE_TEXT_TITLE: &str = "第一章 全文";

/// 行首章节标题：`第<数字><章卷回节>...` 或 `Chapter <数字>...`
const HEADING_PATTERN: &str =
    r"(?m)^\s*第[0-9零一二三四五六七八九十百千]+[章卷回节].*|^\s*Chapter\s+[0-9]+.*";

fn heading_regex() -> &'static Regex {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    HEADING.get_or_init(|| Regex::new(HEADING_PATTERN).expect("heading pattern is valid"))
}

/// 对全文分章
///
/// - 标题行本身作为章节标题保留
/// - 第一个标题之前的非空内容作为「序章」
/// - 正文为空的标题不产生章节
/// - 没有任何标题时返回空列表，由调用方决定整篇作为一章
pub fn segment_chapters(text: &str) -> Vec<Chapter> {
    let headings: Vec<_> = heading_regex().find_iter(text).collect();
    if headings.is_empty() {
        return Vec::new();
    }

    let mut chapters = Vec::with_capacity(headings.len() + 1);

    let preface = text[..headings[0].start()].trim();
    if !preface.is_empty() {
        chapters.push(Chapter::new(PROLOGUE_TITLE, preface));
    }

    for (i, heading) in headings.iter().enumerate() {
        let body_end = headings
            .get(i + 1)
            .map(|next| next.start())
            .unwrap_or(text.len());
        let body = text[heading.end()..body_end].trim();
        if body.is_empty() {
            continue;
        }
        chapters.push(Chapter::new(heading.as_str().trim(), body));
    }

    chapters
}

/// 分章，失败时退化为整篇一章
pub fn segment_or_whole(text: &str) -> Vec<Chapter> {
    let chapters = segment_chapters(text);
    if chapters.is_empty() {
        vec![Chapter::new(WHOLE_TEXT_TITLE, text)]
    } else {
        chapters
    }
}
