//! Nightly journal entries and their AI trend analysis.

use chrono::NaiveDate;
use db::models::journal_entry::{CreateJournalEntry, JournalEntry};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::{
    events::{ChangeEvent, ChangeOp, Collection, EventService},
    insights::{InsightError, InsightService},
    validation::FieldErrors,
};

/// Minimum trimmed length of each reflection field.
pub const MIN_REFLECTION_CHARS: usize = 10;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Validation(#[from] FieldErrors),
    #[error(transparent)]
    Insight(#[from] InsightError),
}

#[derive(Clone)]
pub struct JournalService {
    pool: SqlitePool,
    events: EventService,
    insights: InsightService,
}

impl JournalService {
    pub fn new(pool: SqlitePool, events: EventService, insights: InsightService) -> Self {
        Self {
            pool,
            events,
            insights,
        }
    }

    /// Appends an entry dated `today`. Nothing is written unless every field is valid.
    pub async fn create(
        &self,
        user_id: &str,
        today: NaiveDate,
        data: CreateJournalEntry,
    ) -> Result<JournalEntry, JournalError> {
        let mut errors = FieldErrors::new();
        if data.emotion.is_none() {
            errors.add("emotion", "Select how you felt today.");
        }
        errors.min_chars(
            "achievements",
            &data.achievements,
            MIN_REFLECTION_CHARS,
            "Describe your achievements in at least 10 characters.",
        );
        errors.min_chars(
            "improvements",
            &data.improvements,
            MIN_REFLECTION_CHARS,
            "Describe what to improve in at least 10 characters.",
        );
        errors.min_chars(
            "learnings",
            &data.learnings,
            MIN_REFLECTION_CHARS,
            "Describe what you learned in at least 10 characters.",
        );
        let emotion = match data.emotion {
            Some(emotion) if errors.is_empty() => emotion,
            _ => return Err(errors.into()),
        };
        let entry =
            JournalEntry::create(&self.pool, user_id, Uuid::new_v4(), today, emotion, &data).await?;
        info!(user_id = %user_id, entry_id = %entry.id, "Journal entry saved");
        self.events.publish(ChangeEvent::new(
            user_id,
            Collection::JournalEntries,
            entry.id,
            ChangeOp::Created,
        ));
        Ok(entry)
    }

    /// Newest first.
    pub async fn list(&self, user_id: &str) -> Result<Vec<JournalEntry>, JournalError> {
        Ok(JournalEntry::find_all(&self.pool, user_id).await?)
    }

    /// Trend summary over every entry the user has written.
    pub async fn analyze(&self, user_id: &str) -> Result<String, JournalError> {
        let entries = self.list(user_id).await?;
        let lines = trend_lines(&entries);
        Ok(self.insights.analyze_journal_trends(&lines).await?)
    }
}

/// One line of analysis input per entry.
pub fn trend_lines(entries: &[JournalEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            format!(
                "Date: {}, Emotion: {}, Achievements: {}, Improvements: {}, Learnings: {}",
                entry.date.format("%Y-%m-%d"),
                entry.emotion,
                entry.achievements,
                entry.improvements,
                entry.learnings,
            )
        })
        .collect()
}
