//! HTTP LLM Client - 调用 OpenAI 兼容的 Chat Completions 服务
//!
//! 实现 GenerationServicePort trait
//!
//! 外部 API:
//! POST {base_url}/chat/completions
//! Request: {"model": "...", "messages": [...], "temperature": 0.3, "user": "42"}
//! Response: {"choices": [{"message": {"content": "..."}}]}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{
    ChatMessage, ChatRole, GenerationError, GenerationRequest, GenerationServicePort,
};

/// Chat Completions 请求体
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    user: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP LLM 客户端配置
#[derive(Debug, Clone)]
pub struct HttpLlmClientConfig {
    /// 服务基础 URL（包含 /v1 等版本前缀）
    pub base_url: String,
    /// API Key，为空时不发送 Authorization 头
    pub api_key: Option<String>,
    /// 模型名称
    pub model: String,
    /// 默认请求超时时间（秒），单次请求可用 GenerationRequest::timeout 覆盖
    pub timeout_secs: u64,
}

impl Default for HttpLlmClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 120,
        }
    }
}

impl HttpLlmClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP LLM 客户端
pub struct HttpLlmClient {
    client: Client,
    config: HttpLlmClientConfig,
}

impl HttpLlmClient {
    /// 创建新的 HTTP LLM 客户端
    pub fn new(config: HttpLlmClientConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 获取 Chat Completions URL
    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// 系统提示词放在最前面
    fn build_messages(request: &GenerationRequest) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.system_prompt.is_empty() {
            messages.push(ChatMessage {
                role: ChatRole::System,
                content: request.system_prompt.clone(),
            });
        }
        messages.extend(request.messages.iter().cloned());
        messages
    }
}

#[async_trait]
impl GenerationServicePort for HttpLlmClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: Self::build_messages(&request),
            temperature: request.temperature,
            user: request.user_id.to_string(),
            stream: false,
        };

        tracing::debug!(
            url = %self.completions_url(),
            model = %self.config.model,
            messages = body.messages.len(),
            timeout_ms = request.timeout.as_millis() as u64,
            "Sending chat completion request"
        );

        let mut builder = self
            .client
            .post(self.completions_url())
            .timeout(request.timeout)
            .json(&body);
        if let Some(api_key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout
            } else if e.is_connect() {
                GenerationError::Transport(format!("Cannot connect to LLM service: {}", e))
            } else {
                GenerationError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Service(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout
            } else {
                GenerationError::InvalidResponse(format!("Failed to decode completion: {}", e))
            }
        })?;

        let content = extract_content(completion)?;

        tracing::info!(
            model = %self.config.model,
            response_chars = content.chars().count(),
            "Chat completion finished"
        );

        Ok(content)
    }
}

fn extract_content(completion: ChatCompletionResponse) -> Result<String, GenerationError> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| GenerationError::InvalidResponse("Completion has no content".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = HttpLlmClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:11434/v1");
        assert_eq!(config.timeout_secs, 120);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = HttpLlmClientConfig::new("http://example.com/v1/")
            .with_model("qwen2.5")
            .with_api_key("sk-test")
            .with_timeout(60);
        assert_eq!(config.model, "qwen2.5");
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.timeout_secs, 60);

        let client = HttpLlmClient::new(config).unwrap();
        assert_eq!(client.completions_url(), "http://example.com/v1/chat/completions");
    }

    #[test]
    fn test_system_prompt_goes_first() {
        let request = GenerationRequest {
            system_prompt: "系统".to_string(),
            messages: vec![ChatMessage::user("你好")],
            temperature: 0.3,
            timeout: Duration::from_secs(1),
            user_id: 1,
        };
        let messages = HttpLlmClient::build_messages(&request);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[1].content, "你好");
    }

    #[test]
    fn test_request_serialization() {
        let body = ChatCompletionRequest {
            model: "m",
            messages: vec![ChatMessage::user("hi")],
            temperature: 0.5,
            user: "9".to_string(),
            stream: false,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["user"], "9");
        assert_eq!(value["stream"], false);
    }

    #[test]
    fn test_extract_content() {
        let completion: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "{\"title\": \"x\"}"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_content(completion).unwrap(), "{\"title\": \"x\"}");

        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            extract_content(empty),
            Err(GenerationError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let client = HttpLlmClient::new(HttpLlmClientConfig::new("http://127.0.0.1:1/v1")).unwrap();
        let result = client
            .generate(GenerationRequest {
                system_prompt: String::new(),
                messages: vec![ChatMessage::user("hi")],
                temperature: 0.3,
                timeout: Duration::from_secs(2),
                user_id: 0,
            })
            .await;
        assert!(matches!(
            result,
            Err(GenerationError::Transport(_)) | Err(GenerationError::Timeout)
        ));
    }
}
