use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A recurring daily task worth a fixed number of discipline points.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS, PartialEq)]
pub struct RoutineTask {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub points: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateRoutineTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub points: i64,
}

impl RoutineTask {
    /// `None` when the user already has a task with this title.
    pub async fn create(
        pool: &SqlitePool,
        user_id: &str,
        data: &CreateRoutineTask,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, RoutineTask>(
            r#"INSERT INTO routine_tasks (id, user_id, title, description, points)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT DO NOTHING
               RETURNING id, user_id, title, description, points, created_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.points)
        .fetch_optional(pool)
        .await
    }

    /// All of the user's tasks in creation order.
    pub async fn find_all(pool: &SqlitePool, user_id: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, RoutineTask>(
            r#"SELECT id, user_id, title, description, points, created_at
               FROM routine_tasks
               WHERE user_id = $1
               ORDER BY created_at ASC, rowid ASC"#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn count(pool: &SqlitePool, user_id: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM routine_tasks WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Returns the number of rows removed; zero when the task is not the user's.
    pub async fn delete(pool: &SqlitePool, user_id: &str, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM routine_tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    fn task(title: &str, points: i64) -> CreateRoutineTask {
        CreateRoutineTask {
            title: title.to_string(),
            description: String::new(),
            points,
        }
    }

    #[tokio::test]
    async fn tasks_are_scoped_to_their_owner() {
        let db = DBService::new_in_memory().await.unwrap();
        RoutineTask::create(&db.pool, "alice", &task("Cold shower", 10), Uuid::new_v4())
            .await
            .unwrap();
        RoutineTask::create(&db.pool, "alice", &task("Exercise", 20), Uuid::new_v4())
            .await
            .unwrap();
        let bobs = RoutineTask::create(&db.pool, "bob", &task("Read", 10), Uuid::new_v4())
            .await
            .unwrap()
            .unwrap();

        let alices = RoutineTask::find_all(&db.pool, "alice").await.unwrap();
        assert_eq!(
            alices.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(),
            vec!["Cold shower", "Exercise"]
        );
        assert_eq!(RoutineTask::count(&db.pool, "bob").await.unwrap(), 1);

        assert_eq!(RoutineTask::delete(&db.pool, "alice", bobs.id).await.unwrap(), 0);
        assert_eq!(RoutineTask::delete(&db.pool, "bob", bobs.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_title_is_skipped() {
        let db = DBService::new_in_memory().await.unwrap();
        let first = RoutineTask::create(&db.pool, "alice", &task("Exercise", 10), Uuid::new_v4())
            .await
            .unwrap();
        let again = RoutineTask::create(&db.pool, "alice", &task("Exercise", 30), Uuid::new_v4())
            .await
            .unwrap();
        let other_user = RoutineTask::create(&db.pool, "bob", &task("Exercise", 10), Uuid::new_v4())
            .await
            .unwrap();

        assert!(first.is_some());
        assert!(again.is_none());
        assert!(other_user.is_some());
        assert_eq!(RoutineTask::count(&db.pool, "alice").await.unwrap(), 1);
    }
}
