//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::time::Duration;

use crate::application::analysis::{AnalysisConfig, DEFAULT_PROMPT_NAME};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 文本生成服务配置
    #[serde(default)]
    pub llm: LlmConfig,

    /// 蓝图分析配置
    #[serde(default)]
    pub analysis: AnalysisSettings,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// 组装分析编排器配置，超时取自 llm 配置
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            prompt_name: self.analysis.prompt_name.clone(),
            sample_chapters: self.analysis.sample_chapters,
            sample_chars_per_chapter: self.analysis.sample_chars_per_chapter,
            max_directory_titles: self.analysis.max_directory_titles,
            temperature: self.analysis.temperature,
            timeout: Duration::from_secs(self.llm.timeout_secs),
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 上传文件最大大小（字节），默认 50MB
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5070
}

fn default_max_upload_size() -> u64 {
    50 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 文本生成服务配置（OpenAI 兼容接口）
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// 服务基础 URL
    #[serde(default = "default_llm_url")]
    pub base_url: String,

    /// API Key
    #[serde(default)]
    pub api_key: Option<String>,

    /// 模型名称
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_url(),
            api_key: None,
            model: default_llm_model(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

/// 蓝图分析配置
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSettings {
    /// 提示词模板名称
    #[serde(default = "default_prompt_name")]
    pub prompt_name: String,

    /// 取样章节数
    #[serde(default = "default_sample_chapters")]
    pub sample_chapters: usize,

    /// 每章取样字符数
    #[serde(default = "default_sample_chars")]
    pub sample_chars_per_chapter: usize,

    /// 目录标题上限
    #[serde(default = "default_max_titles")]
    pub max_directory_titles: usize,

    /// 采样温度
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_prompt_name() -> String {
    DEFAULT_PROMPT_NAME.to_string()
}

fn default_sample_chapters() -> usize {
    3
}

fn default_sample_chars() -> usize {
    2000
}

fn default_max_titles() -> usize {
    50
}

fn default_temperature() -> f32 {
    0.3
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            prompt_name: default_prompt_name(),
            sample_chapters: default_sample_chapters(),
            sample_chars_per_chapter: default_sample_chars(),
            max_directory_titles: default_max_titles(),
            temperature: default_temperature(),
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/folio.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别，可被 RUST_LOG 覆盖
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
