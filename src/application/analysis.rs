//! Analysis Orchestrator - 蓝图分析编排
//!
//! 采样 → 组装提示词 → 调用文本生成服务 → 清洗 → 解析 → 标准化 → 构建蓝图。
//! 任意一步失败都退化为占位蓝图，`analyze` 本身不会失败。

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::application::ports::{
    ChatMessage, GenerationError, GenerationRequest, GenerationServicePort, PromptStorePort,
};
use crate::domain::analysis::{normalize_blueprint, sanitize_response};
use crate::domain::novel::{Blueprint, Chapter};

/// 提示词模板在存储中的默认名称
pub const DEFAULT_PROMPT_NAME: &str = "import_analysis";

/// 存储中找不到模板时使用的内置提示词
pub const DEFAULT_ANALYSIS_PROMPT: &str = "\
你是一个专业的网文编辑。请根据提供的小说样本和目录，分析并提取小说信息。
返回 JSON 格式，包含：title, one_sentence_summary, full_synopsis, world_setting (core_rules, key_locations, factions, magic_system), characters, relationships, chapter_outline。
chapter_outline 的每一项包含 chapter_number, title, summary。
注意 world_setting 的 key 必须是 core_rules 和 key_locations。";

/// 分析配置
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// 提示词模板名称
    pub prompt_name: String,
    /// 取样章节数
    pub sample_chapters: usize,
    /// 每章取样字符数
    pub sample_chars_per_chapter: usize,
    /// 附在提示词后的目录标题上限
    pub max_directory_titles: usize,
    /// 采样温度
    pub temperature: f32,
    /// 调用生成服务的超时
    pub timeout: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            prompt_name: DEFAULT_PROMPT_NAME.to_string(),
            sample_chapters: 3,
            sample_chars_per_chapter: 2000,
            max_directory_titles: 50,
            temperature: 0.3,
            timeout: Duration::from_secs(120),
        }
    }
}

/// 分析失败原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisFailure {
    #[error("generation timed out")]
    Timeout,

    #[error("generation transport error: {0}")]
    Transport(String),

    #[error("generation returned invalid output: {0}")]
    InvalidOutput(String),
}

impl AnalysisFailure {
    /// 失败类别（用于日志和接口返回）
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisFailure::Timeout => "timeout",
            AnalysisFailure::Transport(_) => "transport",
            AnalysisFailure::InvalidOutput(_) => "invalid_output",
        }
    }
}

impl From<GenerationError> for AnalysisFailure {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Timeout => AnalysisFailure::Timeout,
            GenerationError::InvalidResponse(msg) => AnalysisFailure::InvalidOutput(msg),
            other => AnalysisFailure::Transport(other.to_string()),
        }
    }
}

/// 分析结果：总有一个可用的蓝图，失败时附带原因
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub blueprint: Blueprint,
    pub failure: Option<AnalysisFailure>,
}

impl AnalysisOutcome {
    pub fn is_fallback(&self) -> bool {
        self.failure.is_some()
    }
}

/// 分析编排器
pub struct AnalysisOrchestrator {
    generation: Arc<dyn GenerationServicePort>,
    prompts: Arc<dyn PromptStorePort>,
    config: AnalysisConfig,
}

impl AnalysisOrchestrator {
    pub fn new(
        generation: Arc<dyn GenerationServicePort>,
        prompts: Arc<dyn PromptStorePort>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            generation,
            prompts,
            config,
        }
    }

    /// 分析章节样本，总是返回一个蓝图
    ///
    /// 返回的大纲尚未对账，调用方需要再与实际章节对账
    pub async fn analyze(&self, chapters: &[Chapter], user_id: i64) -> AnalysisOutcome {
        match self.try_analyze(chapters, user_id).await {
            Ok(blueprint) => {
                tracing::info!(
                    user_id = user_id,
                    title = %blueprint.title,
                    outline_len = blueprint.chapter_outline.len(),
                    "Blueprint analysis completed"
                );
                AnalysisOutcome {
                    blueprint,
                    failure: None,
                }
            }
            Err(failure) => {
                tracing::error!(
                    user_id = user_id,
                    kind = failure.kind(),
                    error = %failure,
                    "Blueprint analysis failed, using stub"
                );
                AnalysisOutcome {
                    blueprint: Blueprint::stub(),
                    failure: Some(failure),
                }
            }
        }
    }

    async fn try_analyze(
        &self,
        chapters: &[Chapter],
        user_id: i64,
    ) -> Result<Blueprint, AnalysisFailure> {
        let sample = build_sample(
            chapters,
            self.config.sample_chapters,
            self.config.sample_chars_per_chapter,
        );
        let system_prompt = self.system_prompt(chapters).await;

        tracing::debug!(
            sample_chars = sample.chars().count(),
            prompt_chars = system_prompt.chars().count(),
            "Sending analysis request"
        );

        let request = GenerationRequest {
            system_prompt,
            messages: vec![ChatMessage::user(format!(
                "请分析以下小说内容：\n\n{}",
                sample
            ))],
            temperature: self.config.temperature,
            timeout: self.config.timeout,
            user_id,
        };

        // 等待上限与请求超时一致
        let raw = tokio::time::timeout(self.config.timeout, self.generation.generate(request))
            .await
            .map_err(|_| AnalysisFailure::Timeout)??;

        parse_blueprint(&raw)
    }

    /// 模板 + 目录参考
    async fn system_prompt(&self, chapters: &[Chapter]) -> String {
        let template = match self.prompts.get_prompt(&self.config.prompt_name).await {
            Ok(Some(template)) if !template.trim().is_empty() => template,
            Ok(_) => DEFAULT_ANALYSIS_PROMPT.to_string(),
            Err(e) => {
                tracing::warn!(
                    prompt = %self.config.prompt_name,
                    error = %e,
                    "Failed to load prompt template, using built-in default"
                );
                DEFAULT_ANALYSIS_PROMPT.to_string()
            }
        };

        let directory: Vec<&str> = chapters
            .iter()
            .take(self.config.max_directory_titles)
            .map(|c| c.title())
            .collect();

        format!("{}\n\n章节列表参考：\n{}", template, directory.join("\n"))
    }
}

/// 取前若干章、每章前若干字符作为样本
pub fn build_sample(chapters: &[Chapter], max_chapters: usize, max_chars: usize) -> String {
    let mut sample = String::new();
    for chapter in chapters.iter().take(max_chapters) {
        let excerpt: String = chapter.body().chars().take(max_chars).collect();
        sample.push_str(chapter.title());
        sample.push('\n');
        sample.push_str(&excerpt);
        sample.push_str("\n\n");
    }
    sample
}

/// 清洗 → 解析 → 标准化 → 构建
pub fn parse_blueprint(raw: &str) -> Result<Blueprint, AnalysisFailure> {
    let sanitized = sanitize_response(raw);
    let parsed: serde_json::Value = serde_json::from_str(&sanitized)
        .map_err(|e| AnalysisFailure::InvalidOutput(format!("JSON parse error: {}", e)))?;
    Blueprint::from_value(normalize_blueprint(parsed))
        .map_err(|e| AnalysisFailure::InvalidOutput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{ChatRole, RepositoryError};
    use crate::domain::novel::{STUB_SUMMARY, STUB_TITLE};
    use crate::infrastructure::adapters::{FakeLlmClient, FakeLlmClientConfig};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// 内存模板存储
    #[derive(Default)]
    struct MemoryPrompts {
        prompts: Mutex<HashMap<String, String>>,
        broken: bool,
    }

    #[async_trait]
    impl PromptStorePort for MemoryPrompts {
        async fn get_prompt(&self, name: &str) -> Result<Option<String>, RepositoryError> {
            if self.broken {
                return Err(RepositoryError::DatabaseError("disk on fire".to_string()));
            }
            Ok(self.prompts.lock().unwrap().get(name).cloned())
        }

        async fn save_prompt(&self, name: &str, content: &str) -> Result<(), RepositoryError> {
            self.prompts
                .lock()
                .unwrap()
                .insert(name.to_string(), content.to_string());
            Ok(())
        }
    }

    fn sample_chapters() -> Vec<Chapter> {
        vec![
            Chapter::new("第一章 风起", "内容A"),
            Chapter::new("第二章 云涌", "内容B"),
        ]
    }

    fn orchestrator(fake: Arc<FakeLlmClient>, prompts: MemoryPrompts) -> AnalysisOrchestrator {
        let config = AnalysisConfig {
            timeout: Duration::from_millis(200),
            ..Default::default()
        };
        AnalysisOrchestrator::new(fake, Arc::new(prompts), config)
    }

    #[test]
    fn test_build_sample_bounds() {
        let long_body = "字".repeat(2500);
        let chapters = vec![
            Chapter::new("一", long_body.clone()),
            Chapter::new("二", "短"),
            Chapter::new("三", "短"),
            Chapter::new("四", "不应出现"),
        ];
        let sample = build_sample(&chapters, 3, 2000);
        assert!(sample.starts_with(&format!("一\n{}\n\n二\n短\n\n", "字".repeat(2000))));
        assert!(sample.ends_with("三\n短\n\n"));
        assert!(!sample.contains("不应出现"));
    }

    #[test]
    fn test_parse_blueprint_full_pipeline() {
        let raw = "<think>分析中</think>\n```json\n{\"title\": \"斗破\", \"world_setting\": {\"rules\": [\"a\", \"b\", \"c\"]}, \"chapter_outline\": [{\"chapter_number\": 1, \"title\": \"x\", \"summary\": \"s\"},]}\n```";
        let blueprint = parse_blueprint(raw).unwrap();
        assert_eq!(blueprint.title, "斗破");
        assert_eq!(blueprint.world_setting.core_rules, "a\nb\nc");
        assert!(blueprint.world_setting.key_locations.is_empty());
        assert_eq!(blueprint.chapter_outline.len(), 1);
    }

    #[test]
    fn test_parse_blueprint_failures() {
        assert!(matches!(
            parse_blueprint("完全不是 JSON"),
            Err(AnalysisFailure::InvalidOutput(_))
        ));
        assert!(matches!(
            parse_blueprint(r#"{"chapter_outline": {"1": "x"}}"#),
            Err(AnalysisFailure::InvalidOutput(_))
        ));
    }

    #[tokio::test]
    async fn test_analyze_success_uses_default_prompt() {
        let fake = Arc::new(FakeLlmClient::new(FakeLlmClientConfig::responding(
            r#"{"title": "风云", "chapter_outline": [{"chapter_number": 1, "title": "x", "summary": "起"}]}"#,
        )));
        let orch = orchestrator(fake.clone(), MemoryPrompts::default());

        let outcome = orch.analyze(&sample_chapters(), 42).await;
        assert!(!outcome.is_fallback());
        assert_eq!(outcome.blueprint.title, "风云");

        let request = fake.last_request().unwrap();
        assert!(request.system_prompt.starts_with(DEFAULT_ANALYSIS_PROMPT));
        assert!(request
            .system_prompt
            .ends_with("章节列表参考：\n第一章 风起\n第二章 云涌"));
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, ChatRole::User);
        assert!(request.messages[0].content.starts_with("请分析以下小说内容：\n\n第一章 风起\n内容A"));
        assert_eq!(request.temperature, 0.3);
        assert_eq!(request.user_id, 42);
    }

    #[tokio::test]
    async fn test_analyze_uses_stored_template() {
        let prompts = MemoryPrompts::default();
        prompts.save_prompt(DEFAULT_PROMPT_NAME, "自定义模板").await.unwrap();
        let fake = Arc::new(FakeLlmClient::new(FakeLlmClientConfig::responding("{}")));
        let orch = orchestrator(fake.clone(), prompts);

        orch.analyze(&sample_chapters(), 1).await;
        let request = fake.last_request().unwrap();
        assert!(request.system_prompt.starts_with("自定义模板\n\n章节列表参考："));
    }

    #[tokio::test]
    async fn test_prompt_store_error_falls_back_to_default() {
        let prompts = MemoryPrompts {
            broken: true,
            ..Default::default()
        };
        let fake = Arc::new(FakeLlmClient::new(FakeLlmClientConfig::responding("{}")));
        let orch = orchestrator(fake.clone(), prompts);

        let outcome = orch.analyze(&sample_chapters(), 1).await;
        assert!(!outcome.is_fallback());
        assert!(fake
            .last_request()
            .unwrap()
            .system_prompt
            .starts_with(DEFAULT_ANALYSIS_PROMPT));
    }

    #[tokio::test]
    async fn test_directory_is_truncated() {
        let chapters: Vec<Chapter> = (1..=60)
            .map(|i| Chapter::new(format!("第{}章", i), "正文"))
            .collect();
        let fake = Arc::new(FakeLlmClient::new(FakeLlmClientConfig::responding("{}")));
        let orch = orchestrator(fake.clone(), MemoryPrompts::default());

        orch.analyze(&chapters, 1).await;
        let prompt = fake.last_request().unwrap().system_prompt;
        assert!(prompt.ends_with("\n第50章"));
        assert!(!prompt.contains("第51章"));
    }

    #[tokio::test]
    async fn test_timeout_returns_stub() {
        let fake = Arc::new(FakeLlmClient::new(
            FakeLlmClientConfig::responding("{}").with_delay(Duration::from_secs(5)),
        ));
        let orch = orchestrator(fake, MemoryPrompts::default());

        let outcome = orch.analyze(&sample_chapters(), 1).await;
        assert_eq!(outcome.failure, Some(AnalysisFailure::Timeout));
        assert_eq!(outcome.blueprint.title, STUB_TITLE);
        assert_eq!(outcome.blueprint.one_sentence_summary, STUB_SUMMARY);
        assert!(outcome.blueprint.chapter_outline.is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_returns_stub() {
        let fake = Arc::new(FakeLlmClient::new(FakeLlmClientConfig::failing(
            "connection refused",
        )));
        let orch = orchestrator(fake, MemoryPrompts::default());

        let outcome = orch.analyze(&sample_chapters(), 1).await;
        assert!(matches!(outcome.failure, Some(AnalysisFailure::Transport(_))));
        assert_eq!(outcome.blueprint, Blueprint::stub());
    }

    #[tokio::test]
    async fn test_invalid_output_discards_partial_result() {
        let fake = Arc::new(FakeLlmClient::new(FakeLlmClientConfig::responding(
            r#"{"title": "部分结果", "chapter_outline": "坏掉了"}"#,
        )));
        let orch = orchestrator(fake, MemoryPrompts::default());

        let outcome = orch.analyze(&sample_chapters(), 1).await;
        assert_eq!(outcome.failure.as_ref().map(|f| f.kind()), Some("invalid_output"));
        assert_eq!(outcome.blueprint.title, STUB_TITLE);
    }
}
