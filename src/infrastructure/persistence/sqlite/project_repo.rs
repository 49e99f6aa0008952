//! SQLite Project Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;
use crate::application::ports::{
    ChapterContentRecord, ChapterRecord, ChapterVersionDraft, ChapterVersionRecord,
    ProjectImport, ProjectRecord, ProjectRepositoryPort, ProjectStatus, RepositoryError,
};
use crate::domain::novel::Blueprint;

/// SQLite Project Repository
pub struct SqliteProjectRepository {
    pool: DbPool,
}

impl SqliteProjectRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}

fn parse_uuid(s: &str) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(s).map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

#[derive(FromRow)]
struct ProjectRow {
    id: String,
    user_id: i64,
    title: String,
    initial_prompt: String,
    status: String,
    blueprint_json: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ProjectRow> for ProjectRecord {
    type Error = RepositoryError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let blueprint = row
            .blueprint_json
            .as_deref()
            .map(serde_json::from_str::<Blueprint>)
            .transpose()
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        Ok(ProjectRecord {
            id: parse_uuid(&row.id)?,
            user_id: row.user_id,
            title: row.title,
            initial_prompt: row.initial_prompt,
            status: ProjectStatus::from_str(&row.status).unwrap_or_default(),
            blueprint,
            created_at: parse_time(&row.created_at)?,
            updated_at: parse_time(&row.updated_at)?,
        })
    }
}

#[derive(FromRow)]
struct ChapterRow {
    id: String,
    project_id: String,
    chapter_number: i64,
    selected_version_index: Option<i64>,
}

impl TryFrom<ChapterRow> for ChapterRecord {
    type Error = RepositoryError;

    fn try_from(row: ChapterRow) -> Result<Self, Self::Error> {
        Ok(ChapterRecord {
            id: parse_uuid(&row.id)?,
            project_id: parse_uuid(&row.project_id)?,
            chapter_number: row.chapter_number as u32,
            selected_version_index: row.selected_version_index.map(|i| i as usize),
        })
    }
}

#[derive(FromRow)]
struct ChapterContentRow {
    id: String,
    project_id: String,
    chapter_number: i64,
    selected_version_index: Option<i64>,
    content: Option<String>,
}

impl TryFrom<ChapterContentRow> for ChapterContentRecord {
    type Error = RepositoryError;

    fn try_from(row: ChapterContentRow) -> Result<Self, Self::Error> {
        let chapter = ChapterRecord::try_from(ChapterRow {
            id: row.id,
            project_id: row.project_id,
            chapter_number: row.chapter_number,
            selected_version_index: row.selected_version_index,
        })?;
        Ok(ChapterContentRecord {
            chapter,
            content: row.content,
        })
    }
}

const PROJECT_COLUMNS: &str =
    "id, user_id, title, initial_prompt, status, blueprint_json, created_at, updated_at";

#[async_trait]
impl ProjectRepositoryPort for SqliteProjectRepository {
    async fn create_project(
        &self,
        user_id: i64,
        title: &str,
        initial_prompt: &str,
    ) -> Result<ProjectRecord, RepositoryError> {
        let now = Utc::now();
        let project = ProjectRecord {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            initial_prompt: initial_prompt.to_string(),
            status: ProjectStatus::Draft,
            blueprint: None,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO projects (id, user_id, title, initial_prompt, status, blueprint_json, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, NULL, ?, ?)
            "#,
        )
        .bind(project.id.to_string())
        .bind(project.user_id)
        .bind(&project.title)
        .bind(&project.initial_prompt)
        .bind(project.status.as_str())
        .bind(project.created_at.to_rfc3339())
        .bind(project.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(project)
    }

    async fn import_project(&self, import: ProjectImport) -> Result<ProjectRecord, RepositoryError> {
        let blueprint_json = serde_json::to_string(&import.blueprint)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        let now = Utc::now();
        let project = ProjectRecord {
            id: Uuid::new_v4(),
            user_id: import.user_id,
            title: import.title,
            initial_prompt: import.initial_prompt,
            status: ProjectStatus::BlueprintReady,
            blueprint: Some(import.blueprint),
            created_at: now,
            updated_at: now,
        };

        // 事务未提交前失败会整体回滚，不留下半成品项目
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query(
            r#"
            INSERT INTO projects (id, user_id, title, initial_prompt, status, blueprint_json, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(project.id.to_string())
        .bind(project.user_id)
        .bind(&project.title)
        .bind(&project.initial_prompt)
        .bind(project.status.as_str())
        .bind(blueprint_json)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        for (i, draft) in import.chapters.iter().enumerate() {
            let chapter_id = Uuid::new_v4().to_string();

            sqlx::query(
                r#"
                INSERT INTO chapters (id, project_id, chapter_number, selected_version_index)
                VALUES (?, ?, ?, 0)
                "#,
            )
            .bind(&chapter_id)
            .bind(project.id.to_string())
            .bind((i + 1) as i64)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

            sqlx::query(
                r#"
                INSERT INTO chapter_versions (id, chapter_id, version_index, content, metadata_json, created_at)
                VALUES (?, ?, 0, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&chapter_id)
            .bind(&draft.content)
            .bind(draft.metadata.to_string())
            .bind(now.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;

        Ok(project)
    }

    async fn replace_blueprint(
        &self,
        project_id: Uuid,
        blueprint: &Blueprint,
    ) -> Result<(), RepositoryError> {
        let json = serde_json::to_string(blueprint)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        let result = sqlx::query("UPDATE projects SET blueprint_json = ?, updated_at = ? WHERE id = ?")
            .bind(json)
            .bind(Utc::now().to_rfc3339())
            .bind(project_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("project {}", project_id)));
        }
        Ok(())
    }

    async fn get_or_create_chapter(
        &self,
        project_id: Uuid,
        chapter_number: u32,
    ) -> Result<ChapterRecord, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO chapters (id, project_id, chapter_number, selected_version_index)
            VALUES (?, ?, ?, NULL)
            ON CONFLICT(project_id, chapter_number) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(project_id.to_string())
        .bind(chapter_number as i64)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        let row: ChapterRow = sqlx::query_as(
            "SELECT id, project_id, chapter_number, selected_version_index FROM chapters WHERE project_id = ? AND chapter_number = ?",
        )
        .bind(project_id.to_string())
        .bind(chapter_number as i64)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        ChapterRecord::try_from(row)
    }

    async fn replace_chapter_versions(
        &self,
        chapter_id: Uuid,
        versions: &[ChapterVersionDraft],
    ) -> Result<Vec<ChapterVersionRecord>, RepositoryError> {
        // 使用事务确保历史版本整体替换
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM chapters WHERE id = ?")
            .bind(chapter_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?;
        if exists.is_none() {
            return Err(RepositoryError::NotFound(format!("chapter {}", chapter_id)));
        }

        sqlx::query("DELETE FROM chapter_versions WHERE chapter_id = ?")
            .bind(chapter_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        // 旧的选中版本已不存在
        sqlx::query("UPDATE chapters SET selected_version_index = NULL WHERE id = ?")
            .bind(chapter_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let now = Utc::now();
        let mut records = Vec::with_capacity(versions.len());
        for (version_index, draft) in versions.iter().enumerate() {
            let record = ChapterVersionRecord {
                id: Uuid::new_v4(),
                chapter_id,
                version_index,
                content: draft.content.clone(),
                metadata: draft.metadata.clone(),
                created_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO chapter_versions (id, chapter_id, version_index, content, metadata_json, created_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(record.id.to_string())
            .bind(chapter_id.to_string())
            .bind(version_index as i64)
            .bind(&record.content)
            .bind(record.metadata.to_string())
            .bind(now.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

            records.push(record);
        }

        tx.commit().await.map_err(db_err)?;

        Ok(records)
    }

    async fn select_chapter_version(
        &self,
        chapter_id: Uuid,
        version_index: usize,
    ) -> Result<(), RepositoryError> {
        let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM chapters WHERE id = ?")
            .bind(chapter_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        if exists.is_none() {
            return Err(RepositoryError::NotFound(format!("chapter {}", chapter_id)));
        }

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM chapter_versions WHERE chapter_id = ?")
                .bind(chapter_id.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(db_err)?;
        if version_index as i64 >= count {
            return Err(RepositoryError::InvalidArgument(format!(
                "version index {} out of range for chapter {} ({} versions)",
                version_index, chapter_id, count
            )));
        }

        sqlx::query("UPDATE chapters SET selected_version_index = ? WHERE id = ?")
            .bind(version_index as i64)
            .bind(chapter_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(())
    }

    async fn update_status(
        &self,
        project_id: Uuid,
        status: ProjectStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE projects SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now().to_rfc3339())
            .bind(project_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("project {}", project_id)));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProjectRecord>, RepositoryError> {
        let row: Option<ProjectRow> = sqlx::query_as(&format!(
            "SELECT {} FROM projects WHERE id = ?",
            PROJECT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(ProjectRecord::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<ProjectRecord>, RepositoryError> {
        let rows: Vec<ProjectRow> = sqlx::query_as(&format!(
            "SELECT {} FROM projects ORDER BY created_at DESC",
            PROJECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(ProjectRecord::try_from).collect()
    }

    async fn find_chapters(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<ChapterContentRecord>, RepositoryError> {
        let rows: Vec<ChapterContentRow> = sqlx::query_as(
            r#"
            SELECT c.id, c.project_id, c.chapter_number, c.selected_version_index, v.content
            FROM chapters c
            LEFT JOIN chapter_versions v
                ON v.chapter_id = c.id AND v.version_index = c.selected_version_index
            WHERE c.project_id = ?
            ORDER BY c.chapter_number
            "#,
        )
        .bind(project_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(ChapterContentRecord::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::novel::ChapterOutlineEntry;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};
    use serde_json::json;

    async fn repo() -> SqliteProjectRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteProjectRepository::new(pool)
    }

    fn draft(content: &str) -> ChapterVersionDraft {
        ChapterVersionDraft {
            content: content.to_string(),
            metadata: json!({ "source": "file_import" }),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_project() {
        let repo = repo().await;
        let created = repo.create_project(5, "风云录", "导入自文件: a.txt").await.unwrap();

        let found = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.user_id, 5);
        assert_eq!(found.title, "风云录");
        assert_eq!(found.status, ProjectStatus::Draft);
        assert!(found.blueprint.is_none());

        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    fn import(chapters: &[&str]) -> ProjectImport {
        let mut blueprint = Blueprint::stub();
        blueprint.chapter_outline = (1..=chapters.len() as u32)
            .map(|n| ChapterOutlineEntry::placeholder(n, format!("第{}章", n)))
            .collect();
        ProjectImport {
            user_id: 3,
            title: "风云录".to_string(),
            initial_prompt: "导入自文件: a.txt".to_string(),
            blueprint,
            chapters: chapters.iter().map(|c| draft(c)).collect(),
        }
    }

    /// 写入内容为 `content` 的版本时让数据库报错
    async fn fail_version_insert(repo: &SqliteProjectRepository, content: &str) {
        sqlx::query(&format!(
            "CREATE TRIGGER fail_version BEFORE INSERT ON chapter_versions \
             WHEN NEW.content = '{}' BEGIN SELECT RAISE(ABORT, 'forced failure'); END",
            content
        ))
        .execute(&repo.pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_import_project_writes_everything() {
        let repo = repo().await;
        let input = import(&["内容A", "内容B"]);
        let blueprint = input.blueprint.clone();

        let project = repo.import_project(input).await.unwrap();
        assert_eq!(project.status, ProjectStatus::BlueprintReady);

        let found = repo.find_by_id(project.id).await.unwrap().unwrap();
        assert_eq!(found.user_id, 3);
        assert_eq!(found.status, ProjectStatus::BlueprintReady);
        assert_eq!(found.blueprint, Some(blueprint));

        let chapters = repo.find_chapters(project.id).await.unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].chapter.chapter_number, 1);
        assert_eq!(chapters[0].chapter.selected_version_index, Some(0));
        assert_eq!(chapters[0].content.as_deref(), Some("内容A"));
        assert_eq!(chapters[1].content.as_deref(), Some("内容B"));
    }

    #[tokio::test]
    async fn test_import_project_rolls_back_on_failure() {
        let repo = repo().await;
        fail_version_insert(&repo, "坏").await;

        let result = repo.import_project(import(&["内容A", "坏", "内容C"])).await;
        assert!(matches!(result, Err(RepositoryError::DatabaseError(_))));

        assert!(repo.find_all().await.unwrap().is_empty());
        let (chapters,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chapters")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        let (versions,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chapter_versions")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!((chapters, versions), (0, 0));
    }

    #[tokio::test]
    async fn test_replace_blueprint_round_trip() {
        let repo = repo().await;
        let project = repo.create_project(1, "t", "").await.unwrap();

        let mut blueprint = Blueprint::stub();
        blueprint.chapter_outline = vec![ChapterOutlineEntry::placeholder(1, "第一章 风起")];
        repo.replace_blueprint(project.id, &blueprint).await.unwrap();

        let found = repo.find_by_id(project.id).await.unwrap().unwrap();
        assert_eq!(found.blueprint, Some(blueprint));

        let missing = repo.replace_blueprint(Uuid::new_v4(), &Blueprint::stub()).await;
        assert!(matches!(missing, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_or_create_chapter_is_idempotent() {
        let repo = repo().await;
        let project = repo.create_project(1, "t", "").await.unwrap();

        let first = repo.get_or_create_chapter(project.id, 1).await.unwrap();
        let again = repo.get_or_create_chapter(project.id, 1).await.unwrap();
        let second = repo.get_or_create_chapter(project.id, 2).await.unwrap();

        assert_eq!(first.id, again.id);
        assert_ne!(first.id, second.id);
        assert_eq!(second.chapter_number, 2);
        assert!(first.selected_version_index.is_none());
    }

    #[tokio::test]
    async fn test_replace_versions_and_select() {
        let repo = repo().await;
        let project = repo.create_project(1, "t", "").await.unwrap();
        let chapter = repo.get_or_create_chapter(project.id, 1).await.unwrap();

        let records = repo
            .replace_chapter_versions(chapter.id, &[draft("旧一"), draft("旧二")])
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].version_index, 1);
        repo.select_chapter_version(chapter.id, 1).await.unwrap();

        // 替换后旧版本全部消失，选中状态被清空
        let records = repo
            .replace_chapter_versions(chapter.id, &[draft("新")])
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].metadata["source"], "file_import");

        let chapters = repo.find_chapters(project.id).await.unwrap();
        assert_eq!(chapters[0].chapter.selected_version_index, None);
        assert_eq!(chapters[0].content, None);

        repo.select_chapter_version(chapter.id, 0).await.unwrap();
        let chapters = repo.find_chapters(project.id).await.unwrap();
        assert_eq!(chapters[0].content.as_deref(), Some("新"));

        let out_of_range = repo.select_chapter_version(chapter.id, 1).await;
        assert!(matches!(out_of_range, Err(RepositoryError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_versions_for_missing_chapter() {
        let repo = repo().await;
        let result = repo.replace_chapter_versions(Uuid::new_v4(), &[draft("x")]).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));

        let result = repo.select_chapter_version(Uuid::new_v4(), 0).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_chapters_ordered_by_number() {
        let repo = repo().await;
        let project = repo.create_project(1, "t", "").await.unwrap();

        for number in [3u32, 1, 2] {
            let chapter = repo.get_or_create_chapter(project.id, number).await.unwrap();
            repo.replace_chapter_versions(chapter.id, &[draft(&format!("正文{}", number))])
                .await
                .unwrap();
            repo.select_chapter_version(chapter.id, 0).await.unwrap();
        }

        let chapters = repo.find_chapters(project.id).await.unwrap();
        let numbers: Vec<u32> = chapters.iter().map(|c| c.chapter.chapter_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(chapters[2].content.as_deref(), Some("正文3"));
    }

    #[tokio::test]
    async fn test_update_status() {
        let repo = repo().await;
        let project = repo.create_project(1, "t", "").await.unwrap();

        repo.update_status(project.id, ProjectStatus::BlueprintReady)
            .await
            .unwrap();
        let found = repo.find_by_id(project.id).await.unwrap().unwrap();
        assert_eq!(found.status, ProjectStatus::BlueprintReady);

        let missing = repo
            .update_status(Uuid::new_v4(), ProjectStatus::BlueprintReady)
            .await;
        assert!(matches!(missing, Err(RepositoryError::NotFound(_))));
    }
}
