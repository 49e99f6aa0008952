//! Novel Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlueprintError {
    #[error("蓝图校验失败: {0}")]
    Validation(String),
}
