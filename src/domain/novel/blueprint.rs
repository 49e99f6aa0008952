//! Novel Context - Blueprint
//!
//! 由文本生成服务分析样本得到的叙事元数据

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entities::null_as_default;
use super::{BlueprintError, ChapterOutlineEntry};

/// 分析失败时的占位标题
pub const STUB_TITLE: &str = "导入的项目";

/// 分析失败时的占位一句话简介
pub const STUB_SUMMARY: &str = "AI分析失败，请手动补充";

/// 世界观设定
///
/// 不变量（经 normalizer 处理后）:
/// - core_rules 总是字符串
/// - key_locations 总是存在，缺省为空列表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSetting {
    #[serde(default, deserialize_with = "null_as_default")]
    pub core_rules: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_locations: Vec<Value>,
    #[serde(default)]
    pub factions: Value,
    #[serde(default)]
    pub magic_system: Value,
}

/// 小说蓝图
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub one_sentence_summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_synopsis: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub world_setting: WorldSetting,
    #[serde(default)]
    pub characters: Value,
    #[serde(default)]
    pub relationships: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chapter_outline: Vec<ChapterOutlineEntry>,
}

impl Blueprint {
    /// 从（已标准化的）JSON 值构建蓝图
    ///
    /// 顶层字段类型错误（例如 chapter_outline 不是数组）时返回校验错误
    pub fn from_value(value: Value) -> Result<Self, BlueprintError> {
        if !value.is_object() {
            return Err(BlueprintError::Validation(
                "blueprint must be a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| BlueprintError::Validation(e.to_string()))
    }

    /// 分析失败时使用的最小蓝图
    pub fn stub() -> Self {
        Self {
            title: STUB_TITLE.to_string(),
            one_sentence_summary: STUB_SUMMARY.to_string(),
            ..Default::default()
        }
    }
}
