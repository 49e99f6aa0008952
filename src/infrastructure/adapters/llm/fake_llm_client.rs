//! Fake LLM Client - 用于测试的文本生成客户端
//!
//! 返回预设文本或预设错误，并记录最近一次请求

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use crate::application::ports::{GenerationError, GenerationRequest, GenerationServicePort};

/// 预设结果
#[derive(Debug, Clone)]
pub enum FakeReply {
    Text(String),
    TransportError(String),
}

/// Fake LLM Client 配置
#[derive(Debug, Clone)]
pub struct FakeLlmClientConfig {
    /// 固定返回的结果
    pub reply: FakeReply,
    /// 模拟推理延迟
    pub delay: Duration,
}

impl FakeLlmClientConfig {
    /// 总是返回给定文本
    pub fn responding(text: impl Into<String>) -> Self {
        Self {
            reply: FakeReply::Text(text.into()),
            delay: Duration::ZERO,
        }
    }

    /// 总是返回传输错误
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: FakeReply::TransportError(message.into()),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Fake LLM Client
pub struct FakeLlmClient {
    config: FakeLlmClientConfig,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl FakeLlmClient {
    pub fn new(config: FakeLlmClientConfig) -> Self {
        Self {
            config,
            last_request: Mutex::new(None),
        }
    }

    /// 最近一次收到的请求
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl GenerationServicePort for FakeLlmClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        tracing::debug!(
            messages = request.messages.len(),
            user_id = request.user_id,
            "FakeLlmClient: returning fixed reply"
        );

        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request);
        }

        if !self.config.delay.is_zero() {
            tokio::time::sleep(self.config.delay).await;
        }

        match &self.config.reply {
            FakeReply::Text(text) => Ok(text.clone()),
            FakeReply::TransportError(message) => Err(GenerationError::Transport(message.clone())),
        }
    }
}
