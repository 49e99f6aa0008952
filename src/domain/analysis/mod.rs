//! Analysis - 模型输出的清洗、标准化与对账
//!
//! 全部是无副作用的纯函数，可在不同导入请求间并发使用

mod normalizer;
mod reconciler;
mod sanitizer;

pub use normalizer::normalize_blueprint;
pub use reconciler::{reconcile_blueprint, reconcile_outline};
pub use sanitizer::{remove_think_tags, repair_json_like_text, sanitize_response, unwrap_markdown_json};
