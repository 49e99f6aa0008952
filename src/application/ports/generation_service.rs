//! Generation Service Port - 文本生成服务抽象
//!
//! 定义调用外部大模型的抽象接口，具体实现在 infrastructure/adapters 层

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 文本生成错误
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Request timeout")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service error: {0}")]
    Service(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 对话角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

/// 对话消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// 文本生成请求
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// 系统提示词
    pub system_prompt: String,
    /// 对话历史（不含系统提示词）
    pub messages: Vec<ChatMessage>,
    /// 采样温度
    pub temperature: f32,
    /// 本次调用的超时预算
    pub timeout: Duration,
    /// 调用方身份（供服务侧计费/追踪）
    pub user_id: i64,
}

/// Generation Service Port
///
/// 外部文本生成服务的抽象接口。重试策略（如有）由实现方负责。
#[async_trait]
pub trait GenerationServicePort: Send + Sync {
    /// 发送提示词并返回模型的原始文本输出
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}
