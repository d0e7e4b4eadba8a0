//! Long-term goals with due-date urgency.

use chrono::NaiveDate;
use db::models::long_term_goal::{LongTermGoal, UpsertLongTermGoal};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use super::{
    events::{ChangeEvent, ChangeOp, Collection, EventService},
    urgency::{Urgency, classify},
    validation::FieldErrors,
};

#[derive(Debug, Error)]
pub enum GoalError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Validation(#[from] FieldErrors),
    #[error("goal not found")]
    NotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct GoalWithUrgency {
    #[serde(flatten)]
    pub goal: LongTermGoal,
    pub urgency: Urgency,
}

/// Goals split the way they are displayed, each list ordered by due date.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct GoalBoard {
    pub active: Vec<GoalWithUrgency>,
    pub completed: Vec<GoalWithUrgency>,
}

#[derive(Clone)]
pub struct GoalService {
    pool: SqlitePool,
    events: EventService,
}

impl GoalService {
    pub fn new(pool: SqlitePool, events: EventService) -> Self {
        Self { pool, events }
    }

    pub async fn board(&self, user_id: &str, today: NaiveDate) -> Result<GoalBoard, GoalError> {
        let goals = LongTermGoal::find_all(&self.pool, user_id).await?;
        let mut board = GoalBoard::default();
        for goal in goals {
            let item = with_urgency(goal, today);
            if item.goal.completed {
                board.completed.push(item);
            } else {
                board.active.push(item);
            }
        }
        Ok(board)
    }

    /// New goals cannot be due before `today`.
    pub async fn create(
        &self,
        user_id: &str,
        data: UpsertLongTermGoal,
        today: NaiveDate,
    ) -> Result<GoalWithUrgency, GoalError> {
        let mut errors = validate(&data);
        if data.due_date < today {
            errors.add("due_date", "Pick a date from today onwards.");
        }
        errors.into_result()?;

        let goal = LongTermGoal::create(&self.pool, user_id, &normalize(data), Uuid::new_v4()).await?;
        self.publish(user_id, goal.id, ChangeOp::Created);
        Ok(with_urgency(goal, today))
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        data: UpsertLongTermGoal,
        today: NaiveDate,
    ) -> Result<GoalWithUrgency, GoalError> {
        validate(&data).into_result()?;
        let goal = LongTermGoal::update(&self.pool, user_id, id, &normalize(data))
            .await?
            .ok_or(GoalError::NotFound)?;
        self.publish(user_id, goal.id, ChangeOp::Updated);
        Ok(with_urgency(goal, today))
    }

    pub async fn toggle_completed(
        &self,
        user_id: &str,
        id: Uuid,
        today: NaiveDate,
    ) -> Result<GoalWithUrgency, GoalError> {
        let current = LongTermGoal::find_by_id(&self.pool, user_id, id)
            .await?
            .ok_or(GoalError::NotFound)?;
        let goal = LongTermGoal::set_completed(&self.pool, user_id, id, !current.completed)
            .await?
            .ok_or(GoalError::NotFound)?;
        self.publish(user_id, goal.id, ChangeOp::Updated);
        Ok(with_urgency(goal, today))
    }

    pub async fn delete(&self, user_id: &str, id: Uuid) -> Result<(), GoalError> {
        if LongTermGoal::delete(&self.pool, user_id, id).await? == 0 {
            return Err(GoalError::NotFound);
        }
        self.publish(user_id, id, ChangeOp::Deleted);
        Ok(())
    }

    fn publish(&self, user_id: &str, id: Uuid, op: ChangeOp) {
        self.events
            .publish(ChangeEvent::new(user_id, Collection::LongTermGoals, id, op));
    }
}

pub fn with_urgency(goal: LongTermGoal, today: NaiveDate) -> GoalWithUrgency {
    let urgency = classify(goal.due_date, goal.completed, today);
    GoalWithUrgency { goal, urgency }
}

fn validate(data: &UpsertLongTermGoal) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.require_text("title", &data.title);
    errors
}

fn normalize(data: UpsertLongTermGoal) -> UpsertLongTermGoal {
    UpsertLongTermGoal {
        title: data.title.trim().to_string(),
        description: data.description.trim().to_string(),
        due_date: data.due_date,
    }
}
