//! 蓝图标准化
//!
//! 在构建 [`Blueprint`](crate::domain::novel::Blueprint) 之前修正 `world_setting`
//! 的常见偏差。规则按顺序执行：
//! 1. `rules` → `core_rules`（仅当 `core_rules` 不存在）
//! 2. `locations` → `key_locations`（仅当 `key_locations` 不存在）
//! 3. `core_rules` 为数组时按换行拼接；缺失时为空字符串
//! 4. `key_locations` 缺失或为 null 时为空数组
//!
//! 其他字段原样保留。该函数不会失败。

use serde_json::{Map, Value};

const WORLD_SETTING: &str = "world_setting";
const CORE_RULES: &str = "core_rules";
const LEGACY_RULES: &str = "rules";
const KEY_LOCATIONS: &str = "key_locations";
const LEGACY_LOCATIONS: &str = "locations";

/// 标准化模型返回的蓝图 JSON
pub fn normalize_blueprint(mut parsed: Value) -> Value {
    if let Some(Value::Object(world_setting)) = parsed.get_mut(WORLD_SETTING) {
        normalize_world_setting(world_setting);
    }
    parsed
}

fn normalize_world_setting(ws: &mut Map<String, Value>) {
    rename_legacy_key(ws, LEGACY_RULES, CORE_RULES);
    rename_legacy_key(ws, LEGACY_LOCATIONS, KEY_LOCATIONS);

    let core_rules = ws
        .remove(CORE_RULES)
        .map(coerce_to_text)
        .unwrap_or_default();
    ws.insert(CORE_RULES.to_string(), Value::String(core_rules));

    let locations = ws
        .entry(KEY_LOCATIONS)
        .or_insert_with(|| Value::Array(Vec::new()));
    if locations.is_null() {
        *locations = Value::Array(Vec::new());
    }
}

fn rename_legacy_key(ws: &mut Map<String, Value>, legacy: &str, canonical: &str) {
    if ws.contains_key(canonical) {
        return;
    }
    if let Some(value) = ws.remove(legacy) {
        ws.insert(canonical.to_string(), value);
    }
}

/// core_rules 总是落成字符串
fn coerce_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}
