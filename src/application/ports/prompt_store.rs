//! Prompt Store Port - 提示词模板存储

use async_trait::async_trait;

use super::RepositoryError;

/// Prompt Store Port
#[async_trait]
pub trait PromptStorePort: Send + Sync {
    /// 按名称获取模板，不存在时返回 None
    async fn get_prompt(&self, name: &str) -> Result<Option<String>, RepositoryError>;

    /// 新增或覆盖模板
    async fn save_prompt(&self, name: &str, content: &str) -> Result<(), RepositoryError>;
}
