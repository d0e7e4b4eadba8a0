//! Daily routine: the user's recurring tasks plus the day's three focus goals.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDate;
use db::models::{
    focus_routine::{Difficulty, FocusRoutine, GOAL_SLOTS, PlanningField},
    routine_task::{CreateRoutineTask, RoutineTask},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{error, info};
use ts_rs::TS;
use uuid::Uuid;

use super::{
    debounce::{Debouncer, FlushSink},
    events::{ChangeEvent, ChangeOp, Collection, EventService},
    scoring::{DailyScore, score_day},
    validation::FieldErrors,
};

/// Tasks every new user starts with: (title, description, points).
pub const DEFAULT_ROUTINE_TASKS: &[(&str, &str, i64)] = &[
    ("Cold shower", "Wake up body and mind. No excuses.", 10),
    ("Exercise", "Move your body. Honor your temple.", 10),
    ("One hour of project work", "Build your future. Invest in yourself.", 10),
    ("Nightly reflection", "Review your day. Learn. Improve.", 10),
];

const MAX_TASK_POINTS: i64 = 100;
const MAX_PLANNING_CHARS: usize = 5_000;

#[derive(Debug, Error)]
pub enum RoutineError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Validation(#[from] FieldErrors),
    #[error("routine task not found")]
    TaskNotFound,
    #[error("routine not found")]
    RoutineNotFound,
}

/// Everything needed to render one day of the routine.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct RoutineDay {
    pub routine: FocusRoutine,
    pub tasks: Vec<RoutineTask>,
    pub score: DailyScore,
}

/// Partial edit of a focus goal; absent fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateFocusGoal {
    pub text: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct PlanningNote {
    pub field: PlanningField,
    pub text: String,
}

/// Debounce key for planning notes: one pending write per user, day and field.
pub type NotesKey = (String, NaiveDate, PlanningField);

/// Writes settled planning notes to the routine row.
pub struct PlanningNotesSink {
    pool: SqlitePool,
    events: EventService,
}

#[async_trait]
impl FlushSink<NotesKey, String> for PlanningNotesSink {
    async fn flush(&self, key: NotesKey, text: String) {
        let (user_id, date, field) = key;
        match FocusRoutine::update_planning_field(&self.pool, &user_id, date, field, &text).await {
            Ok(0) => error!(user_id = %user_id, %date, %field, "Planning note dropped, routine missing"),
            Ok(_) => {
                if let Ok(Some(routine)) = FocusRoutine::find_by_date(&self.pool, &user_id, date).await {
                    self.events.publish(ChangeEvent::new(
                        &user_id,
                        Collection::FocusRoutines,
                        routine.id,
                        ChangeOp::Updated,
                    ));
                }
            }
            Err(e) => error!(user_id = %user_id, %date, %field, error = %e, "Failed to save planning note"),
        }
    }
}

#[derive(Clone)]
pub struct RoutineService {
    pool: SqlitePool,
    events: EventService,
    notes: Debouncer<NotesKey, String>,
}

impl RoutineService {
    pub fn new(pool: SqlitePool, events: EventService, notes_quiet_period: Duration) -> Self {
        let sink = Arc::new(PlanningNotesSink {
            pool: pool.clone(),
            events: events.clone(),
        });
        Self {
            pool,
            events,
            notes: Debouncer::new(notes_quiet_period, sink),
        }
    }

    pub fn notes(&self) -> &Debouncer<NotesKey, String> {
        &self.notes
    }

    /// Gives a user with no routine tasks the default set. Returns how many were inserted;
    /// titles already present are skipped, so concurrent seeding cannot duplicate them.
    pub async fn seed_default_tasks(&self, user_id: &str) -> Result<usize, RoutineError> {
        if RoutineTask::count(&self.pool, user_id).await? > 0 {
            return Ok(0);
        }
        let mut inserted = 0;
        for (title, description, points) in DEFAULT_ROUTINE_TASKS {
            let data = CreateRoutineTask {
                title: title.to_string(),
                description: description.to_string(),
                points: *points,
            };
            if RoutineTask::create(&self.pool, user_id, &data, Uuid::new_v4())
                .await?
                .is_some()
            {
                inserted += 1;
            }
        }
        info!(user_id = %user_id, count = inserted, "Seeded default routine tasks");
        Ok(inserted)
    }

    pub async fn list_tasks(&self, user_id: &str) -> Result<Vec<RoutineTask>, RoutineError> {
        Ok(RoutineTask::find_all(&self.pool, user_id).await?)
    }

    pub async fn create_task(
        &self,
        user_id: &str,
        data: CreateRoutineTask,
    ) -> Result<RoutineTask, RoutineError> {
        let mut errors = FieldErrors::new();
        errors.require_text("title", &data.title);
        errors.in_range("points", data.points, 1, MAX_TASK_POINTS);
        errors.into_result()?;

        let data = CreateRoutineTask {
            title: data.title.trim().to_string(),
            description: data.description.trim().to_string(),
            points: data.points,
        };
        let Some(task) = RoutineTask::create(&self.pool, user_id, &data, Uuid::new_v4()).await?
        else {
            let mut errors = FieldErrors::new();
            errors.add("title", "You already have a task with this title.");
            return Err(errors.into());
        };
        self.events.publish(ChangeEvent::new(
            user_id,
            Collection::RoutineTasks,
            task.id,
            ChangeOp::Created,
        ));
        Ok(task)
    }

    /// Deleting a task leaves past completions in place; scoring ignores them.
    pub async fn delete_task(&self, user_id: &str, task_id: Uuid) -> Result<(), RoutineError> {
        if RoutineTask::delete(&self.pool, user_id, task_id).await? == 0 {
            return Err(RoutineError::TaskNotFound);
        }
        self.events.publish(ChangeEvent::new(
            user_id,
            Collection::RoutineTasks,
            task_id,
            ChangeOp::Deleted,
        ));
        Ok(())
    }

    /// The routine for `date`, created on first access, with its current score.
    pub async fn day(&self, user_id: &str, date: NaiveDate) -> Result<RoutineDay, RoutineError> {
        let routine = FocusRoutine::find_or_create(&self.pool, user_id, date).await?;
        self.assemble(user_id, routine).await
    }

    pub async fn toggle_task(
        &self,
        user_id: &str,
        date: NaiveDate,
        task_id: Uuid,
    ) -> Result<RoutineDay, RoutineError> {
        let tasks = RoutineTask::find_all(&self.pool, user_id).await?;
        if !tasks.iter().any(|t| t.id == task_id) {
            return Err(RoutineError::TaskNotFound);
        }

        let mut routine = FocusRoutine::find_or_create(&self.pool, user_id, date).await?;
        if !routine.completed_task_ids.remove(&task_id) {
            routine.completed_task_ids.insert(task_id);
        }
        if FocusRoutine::save_completed_tasks(&self.pool, user_id, routine.id, &routine.completed_task_ids)
            .await?
            == 0
        {
            return Err(RoutineError::RoutineNotFound);
        }
        self.publish_routine_update(user_id, routine.id);
        self.finish(routine, tasks).await
    }

    /// Applies a partial edit to goal `slot` (0-based).
    ///
    /// A goal must have text to be completed; clearing a goal's text also clears
    /// its completion.
    pub async fn update_goal(
        &self,
        user_id: &str,
        date: NaiveDate,
        slot: usize,
        update: UpdateFocusGoal,
    ) -> Result<RoutineDay, RoutineError> {
        let mut errors = FieldErrors::new();
        if slot >= GOAL_SLOTS {
            errors.add("slot", format!("Must be between 0 and {}.", GOAL_SLOTS - 1));
            return Err(errors.into());
        }

        let mut routine = FocusRoutine::find_or_create(&self.pool, user_id, date).await?;
        let goal = &mut routine.goals[slot];
        if let Some(text) = update.text {
            goal.text = text.trim().to_string();
        }
        if let Some(difficulty) = update.difficulty {
            goal.difficulty = difficulty;
        }
        if let Some(completed) = update.completed {
            if completed && !goal.has_text() {
                errors.add("completed", "Write the goal before marking it complete.");
            } else {
                goal.completed = completed;
            }
        }
        if !goal.has_text() {
            goal.completed = false;
        }
        errors.into_result()?;

        if FocusRoutine::save_goals(&self.pool, user_id, routine.id, &routine.goals).await? == 0 {
            return Err(RoutineError::RoutineNotFound);
        }
        self.publish_routine_update(user_id, routine.id);
        self.assemble(user_id, routine).await
    }

    /// Queues a planning note; only the last value within the quiet period is written.
    pub async fn queue_planning_note(
        &self,
        user_id: &str,
        date: NaiveDate,
        note: PlanningNote,
    ) -> Result<(), RoutineError> {
        let mut errors = FieldErrors::new();
        if note.text.chars().count() > MAX_PLANNING_CHARS {
            errors.add("text", format!("Keep it under {MAX_PLANNING_CHARS} characters."));
        }
        errors.into_result()?;

        // The row must exist, scored, before the debounced update lands on it.
        self.day(user_id, date).await?;
        self.notes
            .push((user_id.to_string(), date, note.field), note.text);
        Ok(())
    }

    async fn assemble(&self, user_id: &str, routine: FocusRoutine) -> Result<RoutineDay, RoutineError> {
        let tasks = RoutineTask::find_all(&self.pool, user_id).await?;
        self.finish(routine, tasks).await
    }

    /// Scores the day and refreshes the stored snapshot when it changed.
    async fn finish(
        &self,
        mut routine: FocusRoutine,
        tasks: Vec<RoutineTask>,
    ) -> Result<RoutineDay, RoutineError> {
        let score = score_day(&tasks, &routine.completed_task_ids, &routine.goals);
        let earned = i64::from(score.earned_points);
        let possible = i64::from(score.possible_points);
        if routine.earned_points != earned || routine.possible_points != possible {
            FocusRoutine::save_score(&self.pool, &routine.user_id, routine.id, earned, possible).await?;
            routine.earned_points = earned;
            routine.possible_points = possible;
        }
        Ok(RoutineDay {
            routine,
            tasks,
            score,
        })
    }

    fn publish_routine_update(&self, user_id: &str, routine_id: Uuid) {
        self.events.publish(ChangeEvent::new(
            user_id,
            Collection::FocusRoutines,
            routine_id,
            ChangeOp::Updated,
        ));
    }
}
