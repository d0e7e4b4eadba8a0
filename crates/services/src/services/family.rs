//! Family time: connection checklist and scheduled activities.

use db::models::{
    connection_task::ConnectionTask,
    family_event::{FamilyEvent, UpsertFamilyEvent},
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::{
    events::{ChangeEvent, ChangeOp, Collection, EventService},
    validation::FieldErrors,
};

/// Checklist a user starts with the first time the family page is opened.
pub const DEFAULT_CONNECTION_TASKS: &[&str] = &[
    "Read a book together",
    "Go to the park without phones",
    "Teach something new",
    "Cook a meal together",
];

#[derive(Debug, Error)]
pub enum FamilyError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Validation(#[from] FieldErrors),
    #[error("connection task not found")]
    TaskNotFound,
    #[error("family event not found")]
    EventNotFound,
}

#[derive(Clone)]
pub struct FamilyService {
    pool: SqlitePool,
    events: EventService,
}

impl FamilyService {
    pub fn new(pool: SqlitePool, events: EventService) -> Self {
        Self { pool, events }
    }

    /// The user's checklist, seeded with the defaults when empty.
    pub async fn connection_tasks(&self, user_id: &str) -> Result<Vec<ConnectionTask>, FamilyError> {
        let tasks = ConnectionTask::find_all(&self.pool, user_id).await?;
        if !tasks.is_empty() {
            return Ok(tasks);
        }

        // A concurrent first read may have seeded some titles already; those are skipped.
        let mut inserted = 0;
        for title in DEFAULT_CONNECTION_TASKS {
            if let Some(task) = ConnectionTask::create(&self.pool, user_id, title, Uuid::new_v4()).await? {
                self.publish(user_id, Collection::ConnectionTasks, task.id, ChangeOp::Created);
                inserted += 1;
            }
        }
        info!(user_id = %user_id, count = inserted, "Seeded connection tasks");

        Ok(ConnectionTask::find_all(&self.pool, user_id).await?)
    }

    pub async fn toggle_connection_task(
        &self,
        user_id: &str,
        id: Uuid,
    ) -> Result<ConnectionTask, FamilyError> {
        let current = ConnectionTask::find_by_id(&self.pool, user_id, id)
            .await?
            .ok_or(FamilyError::TaskNotFound)?;
        let task = ConnectionTask::set_completed(&self.pool, user_id, id, !current.completed)
            .await?
            .ok_or(FamilyError::TaskNotFound)?;
        self.publish(user_id, Collection::ConnectionTasks, task.id, ChangeOp::Updated);
        Ok(task)
    }

    pub async fn list_events(&self, user_id: &str) -> Result<Vec<FamilyEvent>, FamilyError> {
        Ok(FamilyEvent::find_all(&self.pool, user_id).await?)
    }

    /// Most recently scheduled activity, if any.
    pub async fn latest_event(&self, user_id: &str) -> Result<Option<FamilyEvent>, FamilyError> {
        Ok(FamilyEvent::find_latest(&self.pool, user_id).await?)
    }

    pub async fn create_event(
        &self,
        user_id: &str,
        data: UpsertFamilyEvent,
    ) -> Result<FamilyEvent, FamilyError> {
        let data = validate_event(data)?;
        let event = FamilyEvent::create(&self.pool, user_id, &data, Uuid::new_v4()).await?;
        self.publish(user_id, Collection::FamilyEvents, event.id, ChangeOp::Created);
        Ok(event)
    }

    pub async fn update_event(
        &self,
        user_id: &str,
        id: Uuid,
        data: UpsertFamilyEvent,
    ) -> Result<FamilyEvent, FamilyError> {
        let data = validate_event(data)?;
        let event = FamilyEvent::update(&self.pool, user_id, id, &data)
            .await?
            .ok_or(FamilyError::EventNotFound)?;
        self.publish(user_id, Collection::FamilyEvents, event.id, ChangeOp::Updated);
        Ok(event)
    }

    fn publish(&self, user_id: &str, collection: Collection, id: Uuid, op: ChangeOp) {
        self.events
            .publish(ChangeEvent::new(user_id, collection, id, op));
    }
}

fn validate_event(data: UpsertFamilyEvent) -> Result<UpsertFamilyEvent, FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.require_text("activity", &data.activity);
    errors.into_result()?;
    Ok(UpsertFamilyEvent {
        activity: data.activity.trim().to_string(),
        scheduled_at: data.scheduled_at,
    })
}
