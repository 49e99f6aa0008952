//! SQLite Prompt Store

use async_trait::async_trait;
use chrono::Utc;

use super::DbPool;
use crate::application::ports::{PromptStorePort, RepositoryError};

/// SQLite Prompt Store
pub struct SqlitePromptStore {
    pool: DbPool,
}

impl SqlitePromptStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PromptStorePort for SqlitePromptStore {
    async fn get_prompt(&self, name: &str) -> Result<Option<String>, RepositoryError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT content FROM prompts WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(row.map(|(content,)| content))
    }

    async fn save_prompt(&self, name: &str, content: &str) -> Result<(), RepositoryError> {
        if name.trim().is_empty() {
            return Err(RepositoryError::InvalidArgument("prompt name is empty".to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO prompts (name, content, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                content = excluded.content,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(name)
        .bind(content)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
