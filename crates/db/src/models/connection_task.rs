use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A small checklist item for connecting with family.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ConnectionTask {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl ConnectionTask {
    /// `None` when the user already has a task with this title.
    pub async fn create(
        pool: &SqlitePool,
        user_id: &str,
        title: &str,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ConnectionTask>(
            r#"INSERT INTO connection_tasks (id, user_id, title)
               VALUES ($1, $2, $3)
               ON CONFLICT DO NOTHING
               RETURNING id, user_id, title, completed, created_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(title)
        .fetch_optional(pool)
        .await
    }

    /// Alphabetical by title.
    pub async fn find_all(pool: &SqlitePool, user_id: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ConnectionTask>(
            r#"SELECT id, user_id, title, completed, created_at
               FROM connection_tasks
               WHERE user_id = $1
               ORDER BY title COLLATE NOCASE ASC"#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        user_id: &str,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ConnectionTask>(
            r#"SELECT id, user_id, title, completed, created_at
               FROM connection_tasks
               WHERE id = $1 AND user_id = $2"#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn set_completed(
        pool: &SqlitePool,
        user_id: &str,
        id: Uuid,
        completed: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ConnectionTask>(
            r#"UPDATE connection_tasks
               SET completed = $3
               WHERE id = $1 AND user_id = $2
               RETURNING id, user_id, title, completed, created_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(completed)
        .fetch_optional(pool)
        .await
    }
}
