//! Novel Context - Entities

use serde::{Deserialize, Deserializer, Serialize};

/// 章节 - 分章结果的最小单位
///
/// 不变量:
/// - 章节编号即其在列表中的位置（从 1 开始），不取自标题中的数字
/// - 由分章器产出的章节 body 去除首尾空白后非空
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// 章节标题（原文中的标题行）
    title: String,
    /// 章节正文
    body: String,
}

impl Chapter {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// 章节大纲条目
///
/// 对账之后 chapter_number 等于最终章节列表中的位置（从 1 开始）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterOutlineEntry {
    #[serde(deserialize_with = "lenient_chapter_number")]
    pub chapter_number: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
}

impl ChapterOutlineEntry {
    pub fn new(chapter_number: u32, title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            chapter_number,
            title: title.into(),
            summary: summary.into(),
        }
    }

    /// 未被分析覆盖的章节使用的占位条目
    pub fn placeholder(chapter_number: u32, title: impl Into<String>) -> Self {
        Self::new(chapter_number, title, String::new())
    }
}

/// 显式 null 与缺失字段一样取默认值
pub(super) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 章节编号接受整数或数字字符串（模型常把 "3" 写成字符串）
fn lenient_chapter_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(u32),
        Text(String),
    }

    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("invalid chapter_number: {:?}", s))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_accessors() {
        let chapter = Chapter::new("第一章 风起", "内容A");
        assert_eq!(chapter.title(), "第一章 风起");
        assert_eq!(chapter.body(), "内容A");
    }

    #[test]
    fn test_outline_entry_accepts_numeric_string() {
        let entry: ChapterOutlineEntry =
            serde_json::from_str(r#"{"chapter_number": " 7 ", "title": "t"}"#).unwrap();
        assert_eq!(entry.chapter_number, 7);
        assert_eq!(entry.summary, "");
    }

    #[test]
    fn test_outline_entry_null_fields() {
        let entry: ChapterOutlineEntry =
            serde_json::from_str(r#"{"chapter_number": 2, "title": null, "summary": null}"#)
                .unwrap();
        assert_eq!(entry, ChapterOutlineEntry::placeholder(2, ""));
    }

    #[test]
    fn test_outline_entry_rejects_garbage_number() {
        let result: Result<ChapterOutlineEntry, _> =
            serde_json::from_str(r#"{"chapter_number": "seven"}"#);
        assert!(result.is_err());

        let result: Result<ChapterOutlineEntry, _> =
            serde_json::from_str(r#"{"chapter_number": -1}"#);
        assert!(result.is_err());
    }
}
