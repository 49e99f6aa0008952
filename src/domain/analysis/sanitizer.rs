//! 模型输出清洗
//!
//! 把文本生成服务返回的「近似 JSON」尽量修成可解析的 JSON 文本。
//! 每一步都只做变换，不会失败；最终能否解析由调用方判断。

use std::sync::OnceLock;

use regex::{Captures, Regex};

fn think_regex() -> &'static Regex {
    static THINK: OnceLock<Regex> = OnceLock::new();
    THINK.get_or_init(|| Regex::new(r"(?s)<think>.*?</think>").expect("think pattern is valid"))
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```[ \t]*([A-Za-z0-9_-]*)[ \t]*\r?\n?(.*?)```").expect("fence pattern is valid")
    })
}

/// 完整清洗流程：去推理块 → 拆 markdown 代码块 → 修复
pub fn sanitize_response(raw: &str) -> String {
    let text = remove_think_tags(raw);
    let text = unwrap_markdown_json(&text);
    repair_json_like_text(&text)
}

/// 去掉模型前置的 `<think>...</think>` 推理内容
///
/// 只有开标签没有闭标签时，开标签之后的内容都视为推理内容
pub fn remove_think_tags(text: &str) -> String {
    let stripped = think_regex().replace_all(text, "");
    match stripped.find("<think>") {
        Some(start) => stripped[..start].trim().to_string(),
        None => stripped.trim().to_string(),
    }
}

/// 取出 markdown 代码块内容，优先 ```json，否则取第一个代码块
///
/// 只有文本本身被代码块包裹时才拆开：以代码块开头，或代码块之外没有 `{`。
/// 否则原样返回（去首尾空白），JSON 字符串里出现的 ``` 不受影响
pub fn unwrap_markdown_json(text: &str) -> String {
    let trimmed = text.trim();
    let fences: Vec<_> = fence_regex().captures_iter(trimmed).collect();
    if fences.is_empty() {
        return trimmed.to_string();
    }

    if !trimmed.starts_with("```") && has_brace_outside(trimmed, &fences) {
        return trimmed.to_string();
    }

    fences
        .iter()
        .find(|caps| {
            caps.get(1)
                .is_some_and(|lang| lang.as_str().eq_ignore_ascii_case("json"))
        })
        .or_else(|| fences.first())
        .map(fence_body)
        .unwrap_or_else(|| trimmed.to_string())
}

fn fence_body(caps: &Captures<'_>) -> String {
    caps.get(2)
        .map(|m| m.as_str())
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// 代码块之外是否出现 `{`
fn has_brace_outside(text: &str, fences: &[Captures<'_>]) -> bool {
    let mut cursor = 0;
    for caps in fences {
        let Some(whole) = caps.get(0) else { continue };
        if text[cursor..whole.start()].contains('{') {
            return true;
        }
        cursor = whole.end();
    }
    text[cursor..].contains('{')
}

/// 保守修复：只保留最外层 `{...}`，并去掉 `}`/`]` 前多余的逗号
pub fn repair_json_like_text(text: &str) -> String {
    let span = outermost_object(text).unwrap_or_else(|| text.trim());
    strip_trailing_commas(span)
}

/// 找到第一个 `{` 以及与之配对的 `}`（跳过字符串字面量内部的括号）
///
/// 括号不配平时退化为第一个 `{` 到最后一个 `}`
fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// 删除紧跟在 `}` 或 `]` 前（中间只隔空白）的逗号，字符串内部不动
fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &ch) in chars.iter().enumerate() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            out.push(ch);
            continue;
        }
        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(ch);
                }
            }
            _ => out.push(ch),
        }
    }

    out
}
