use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// Time set aside for a family activity.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct FamilyEvent {
    pub id: Uuid,
    pub user_id: String,
    pub activity: String,
    pub scheduled_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpsertFamilyEvent {
    pub activity: String,
    pub scheduled_at: DateTime<Utc>,
}

impl FamilyEvent {
    pub async fn create(
        pool: &SqlitePool,
        user_id: &str,
        data: &UpsertFamilyEvent,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, FamilyEvent>(
            r#"INSERT INTO family_events (id, user_id, activity, scheduled_at)
               VALUES ($1, $2, $3, $4)
               RETURNING id, user_id, activity, scheduled_at, created_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&data.activity)
        .bind(data.scheduled_at)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        user_id: &str,
        id: Uuid,
        data: &UpsertFamilyEvent,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, FamilyEvent>(
            r#"UPDATE family_events
               SET activity = $3, scheduled_at = $4
               WHERE id = $1 AND user_id = $2
               RETURNING id, user_id, activity, scheduled_at, created_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&data.activity)
        .bind(data.scheduled_at)
        .fetch_optional(pool)
        .await
    }

    /// Events with the latest schedule first.
    pub async fn find_all(pool: &SqlitePool, user_id: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, FamilyEvent>(
            r#"SELECT id, user_id, activity, scheduled_at, created_at
               FROM family_events
               WHERE user_id = $1
               ORDER BY scheduled_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_latest(pool: &SqlitePool, user_id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, FamilyEvent>(
            r#"SELECT id, user_id, activity, scheduled_at, created_at
               FROM family_events
               WHERE user_id = $1
               ORDER BY scheduled_at DESC
               LIMIT 1"#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::DBService;

    #[tokio::test]
    async fn latest_event_is_the_furthest_scheduled() {
        let db = DBService::new_in_memory().await.unwrap();
        let park = UpsertFamilyEvent {
            activity: "Park without phones".to_string(),
            scheduled_at: Utc.with_ymd_and_hms(2026, 10, 25, 10, 0, 0).unwrap(),
        };
        let cooking = UpsertFamilyEvent {
            activity: "Cook together".to_string(),
            scheduled_at: Utc.with_ymd_and_hms(2026, 10, 21, 18, 30, 0).unwrap(),
        };
        FamilyEvent::create(&db.pool, "alice", &park, Uuid::new_v4()).await.unwrap();
        let cook = FamilyEvent::create(&db.pool, "alice", &cooking, Uuid::new_v4())
            .await
            .unwrap();

        let latest = FamilyEvent::find_latest(&db.pool, "alice").await.unwrap().unwrap();
        assert_eq!(latest.activity, "Park without phones");

        let moved = UpsertFamilyEvent {
            scheduled_at: Utc.with_ymd_and_hms(2026, 11, 1, 12, 0, 0).unwrap(),
            ..cooking
        };
        FamilyEvent::update(&db.pool, "alice", cook.id, &moved).await.unwrap();
        let latest = FamilyEvent::find_latest(&db.pool, "alice").await.unwrap().unwrap();
        assert_eq!(latest.id, cook.id);
        assert_eq!(FamilyEvent::find_all(&db.pool, "alice").await.unwrap().len(), 2);
    }
}
