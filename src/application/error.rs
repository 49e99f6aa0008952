//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;
use uuid::Uuid;

use crate::application::ports::{DecodeError, RepositoryError};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: Uuid,
    },

    /// 文件编码不受支持（UTF-8 与 GBK 均解码失败）
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// 文件内容为空
    #[error("Document is empty")]
    EmptyDocument,

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: Uuid) -> Self {
        Self::NotFound { resource_type, id }
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        Self::RepositoryError(err.to_string())
    }
}

impl From<DecodeError> for ApplicationError {
    fn from(err: DecodeError) -> Self {
        Self::UnsupportedEncoding(err.to_string())
    }
}
