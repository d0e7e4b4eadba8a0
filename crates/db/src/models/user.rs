use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

/// Profile of a user signed in through the identity provider.
///
/// `id` is the provider's opaque user id and scopes every other table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct UserProfile {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields reported by the identity provider after a successful sign-in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpsertUserProfile {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl UserProfile {
    /// Create-or-merge: fields missing from `data` keep their stored value.
    pub async fn upsert(
        pool: &SqlitePool,
        user_id: &str,
        data: &UpsertUserProfile,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            r#"INSERT INTO users (id, email, display_name, photo_url)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT(id) DO UPDATE SET
                   email        = COALESCE(excluded.email, users.email),
                   display_name = COALESCE(excluded.display_name, users.display_name),
                   photo_url    = COALESCE(excluded.photo_url, users.photo_url),
                   updated_at   = datetime('now', 'subsec')
               RETURNING id, email, display_name, photo_url, created_at, updated_at"#,
        )
        .bind(user_id)
        .bind(&data.email)
        .bind(&data.display_name)
        .bind(&data.photo_url)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, user_id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            r#"SELECT id, email, display_name, photo_url, created_at, updated_at
               FROM users
               WHERE id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }
}
