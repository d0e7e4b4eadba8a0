use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A goal with a due date, independent of any single day.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS, PartialEq)]
pub struct LongTermGoal {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body shared by create and edit; editing never touches `completed`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpsertLongTermGoal {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: NaiveDate,
}

impl LongTermGoal {
    pub async fn create(
        pool: &SqlitePool,
        user_id: &str,
        data: &UpsertLongTermGoal,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, LongTermGoal>(
            r#"INSERT INTO long_term_goals (id, user_id, title, description, due_date)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, user_id, title, description, due_date, completed, created_at, updated_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.due_date)
        .fetch_one(pool)
        .await
    }

    /// All of the user's goals, soonest due first.
    pub async fn find_all(pool: &SqlitePool, user_id: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, LongTermGoal>(
            r#"SELECT id, user_id, title, description, due_date, completed, created_at, updated_at
               FROM long_term_goals
               WHERE user_id = $1
               ORDER BY due_date ASC, created_at ASC"#,
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
        sqlx::query_as::<_, LongTermGoal>(
            r#"SELECT id, user_id, title, description, due_date, completed, created_at, updated_at
               FROM long_term_goals
               WHERE id = $1 AND user_id = $2"#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        user_id: &str,
        id: Uuid,
        data: &UpsertLongTermGoal,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, LongTermGoal>(
            r#"UPDATE long_term_goals
               SET title = $3,
                   description = $4,
                   due_date = $5,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1 AND user_id = $2
               RETURNING id, user_id, title, description, due_date, completed, created_at, updated_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.due_date)
        .fetch_optional(pool)
        .await
    }

    pub async fn set_completed(
        pool: &SqlitePool,
        user_id: &str,
        id: Uuid,
        completed: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, LongTermGoal>(
            r#"UPDATE long_term_goals
               SET completed = $3,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1 AND user_id = $2
               RETURNING id, user_id, title, description, due_date, completed, created_at, updated_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(completed)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, user_id: &str, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM long_term_goals WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
