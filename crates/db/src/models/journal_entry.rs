use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// How the user felt on the day of the entry.
#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "emotion", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Emotion {
    Focused,
    Energized,
    Tired,
    Content,
    Frustrated,
}

/// A nightly reflection. Entries are append-only.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: String,
    pub date: NaiveDate,
    pub emotion: Emotion,
    pub achievements: String,
    pub improvements: String,
    pub learnings: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateJournalEntry {
    pub emotion: Option<Emotion>,
    pub achievements: String,
    pub improvements: String,
    pub learnings: String,
}

impl JournalEntry {
    pub async fn create(
        pool: &SqlitePool,
        user_id: &str,
        id: Uuid,
        date: NaiveDate,
        emotion: Emotion,
        data: &CreateJournalEntry,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, JournalEntry>(
            r#"INSERT INTO journal_entries (id, user_id, date, emotion, achievements, improvements, learnings)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id, user_id, date, emotion, achievements, improvements, learnings, created_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(date)
        .bind(emotion)
        .bind(data.achievements.trim())
        .bind(data.improvements.trim())
        .bind(data.learnings.trim())
        .fetch_one(pool)
        .await
    }

    pub async fn count(pool: &SqlitePool, user_id: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM journal_entries WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Newest entries first.
    pub async fn find_all(pool: &SqlitePool, user_id: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, JournalEntry>(
            r#"SELECT id, user_id, date, emotion, achievements, improvements, learnings, created_at
               FROM journal_entries
               WHERE user_id = $1
               ORDER BY created_at DESC, rowid DESC"#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    #[tokio::test]
    async fn newest_entry_comes_first() {
        let db = DBService::new_in_memory().await.unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        for (emotion, text) in [(Emotion::Tired, "first entry text"), (Emotion::Focused, "second entry text")] {
            let data = CreateJournalEntry {
                emotion: Some(emotion),
                achievements: text.to_string(),
                improvements: text.to_string(),
                learnings: text.to_string(),
            };
            JournalEntry::create(&db.pool, "alice", Uuid::new_v4(), date, emotion, &data)
                .await
                .unwrap();
        }

        let entries = JournalEntry::find_all(&db.pool, "alice").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].emotion, Emotion::Focused);
        assert!(JournalEntry::find_all(&db.pool, "bob").await.unwrap().is_empty());
        assert_eq!(JournalEntry::count(&db.pool, "alice").await.unwrap(), 2);
        assert_eq!(JournalEntry::count(&db.pool, "bob").await.unwrap(), 0);
    }
}
