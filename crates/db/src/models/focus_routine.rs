use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Number of focus goals in every daily routine.
pub const GOAL_SLOTS: usize = 3;

/// Difficulty of a focus goal; doubles as its point value.
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "difficulty", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn points(self) -> u32 {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Medium => 20,
            Difficulty::Hard => 30,
        }
    }
}

/// One of the day's three objectives. An empty `text` marks an unused slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
pub struct FocusGoal {
    pub text: String,
    pub completed: bool,
    pub difficulty: Difficulty,
}

impl FocusGoal {
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Freeform text fields of a routine that are saved through the debouncer.
#[derive(
    Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS, EnumString,
    Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlanningField {
    MorningPlan,
    EveningReview,
}

/// A user's routine for one calendar day. At most one exists per (user, date).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct FocusRoutine {
    pub id: Uuid,
    pub user_id: String,
    pub date: NaiveDate,
    pub goals: [FocusGoal; GOAL_SLOTS],
    pub completed_task_ids: BTreeSet<Uuid>,
    pub morning_plan: String,
    pub evening_review: String,
    pub earned_points: i64,
    pub possible_points: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FocusRoutine {
    /// Stored progress for the day, 0 when nothing was possible.
    pub fn stored_progress_percent(&self) -> f64 {
        if self.possible_points <= 0 {
            0.0
        } else {
            self.earned_points as f64 / self.possible_points as f64 * 100.0
        }
    }
}

#[derive(FromRow)]
struct FocusRoutineRow {
    id: Uuid,
    user_id: String,
    date: NaiveDate,
    goal1_text: String,
    goal1_difficulty: Difficulty,
    goal1_completed: bool,
    goal2_text: String,
    goal2_difficulty: Difficulty,
    goal2_completed: bool,
    goal3_text: String,
    goal3_difficulty: Difficulty,
    goal3_completed: bool,
    completed_task_ids: String, // JSON array of task ids
    morning_plan: String,
    evening_review: String,
    earned_points: i64,
    possible_points: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<FocusRoutineRow> for FocusRoutine {
    type Error = sqlx::Error;

    fn try_from(row: FocusRoutineRow) -> Result<Self, Self::Error> {
        let completed_task_ids: BTreeSet<Uuid> = serde_json::from_str(&row.completed_task_ids)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(FocusRoutine {
            id: row.id,
            user_id: row.user_id,
            date: row.date,
            goals: [
                FocusGoal {
                    text: row.goal1_text,
                    completed: row.goal1_completed,
                    difficulty: row.goal1_difficulty,
                },
                FocusGoal {
                    text: row.goal2_text,
                    completed: row.goal2_completed,
                    difficulty: row.goal2_difficulty,
                },
                FocusGoal {
                    text: row.goal3_text,
                    completed: row.goal3_completed,
                    difficulty: row.goal3_difficulty,
                },
            ],
            completed_task_ids,
            morning_plan: row.morning_plan,
            evening_review: row.evening_review,
            earned_points: row.earned_points,
            possible_points: row.possible_points,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_ROUTINE: &str = r#"SELECT
    id, user_id, date,
    goal1_text, goal1_difficulty, goal1_completed,
    goal2_text, goal2_difficulty, goal2_completed,
    goal3_text, goal3_difficulty, goal3_completed,
    completed_task_ids, morning_plan, evening_review,
    earned_points, possible_points, created_at, updated_at
FROM focus_routines"#;

impl FocusRoutine {
    /// Returns the user's routine for `date`, creating an empty one on first access.
    pub async fn find_or_create(
        pool: &SqlitePool,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query(
            r#"INSERT INTO focus_routines (id, user_id, date)
               VALUES ($1, $2, $3)
               ON CONFLICT(user_id, date) DO NOTHING"#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(date)
        .execute(pool)
        .await?;

        Self::find_by_date(pool, user_id, date)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_date(
        pool: &SqlitePool,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, FocusRoutineRow>(&format!(
            "{SELECT_ROUTINE} WHERE user_id = $1 AND date = $2"
        ))
        .bind(user_id)
        .bind(date)
        .fetch_optional(pool)
        .await?;
        row.map(FocusRoutine::try_from).transpose()
    }

    /// Routines dated within `from..=to`, oldest first.
    pub async fn find_in_range(
        pool: &SqlitePool,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, FocusRoutineRow>(&format!(
            "{SELECT_ROUTINE} WHERE user_id = $1 AND date >= $2 AND date <= $3 ORDER BY date ASC"
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await?;
        rows.into_iter().map(FocusRoutine::try_from).collect()
    }

    /// Overwrites all three goal slots.
    pub async fn save_goals(
        pool: &SqlitePool,
        user_id: &str,
        id: Uuid,
        goals: &[FocusGoal; GOAL_SLOTS],
    ) -> Result<u64, sqlx::Error> {
        let [g1, g2, g3] = goals;
        let result = sqlx::query(
            r#"UPDATE focus_routines
               SET goal1_text = $3, goal1_difficulty = $4, goal1_completed = $5,
                   goal2_text = $6, goal2_difficulty = $7, goal2_completed = $8,
                   goal3_text = $9, goal3_difficulty = $10, goal3_completed = $11,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1 AND user_id = $2"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&g1.text)
        .bind(g1.difficulty)
        .bind(g1.completed)
        .bind(&g2.text)
        .bind(g2.difficulty)
        .bind(g2.completed)
        .bind(&g3.text)
        .bind(g3.difficulty)
        .bind(g3.completed)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn save_completed_tasks(
        pool: &SqlitePool,
        user_id: &str,
        id: Uuid,
        completed_task_ids: &BTreeSet<Uuid>,
    ) -> Result<u64, sqlx::Error> {
        let json = serde_json::to_string(completed_task_ids)
            .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
        let result = sqlx::query(
            r#"UPDATE focus_routines
               SET completed_task_ids = $3,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1 AND user_id = $2"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(json)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Stores the day's score so history can be charted without recomputation.
    pub async fn save_score(
        pool: &SqlitePool,
        user_id: &str,
        id: Uuid,
        earned_points: i64,
        possible_points: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE focus_routines
               SET earned_points = $3,
                   possible_points = $4
               WHERE id = $1 AND user_id = $2"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(earned_points)
        .bind(possible_points)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Dates up to `to` whose stored score earned every possible point, oldest first.
    pub async fn find_completed_dates(
        pool: &SqlitePool,
        user_id: &str,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, sqlx::Error> {
        sqlx::query_scalar::<_, NaiveDate>(
            r#"SELECT date
               FROM focus_routines
               WHERE user_id = $1
                 AND date <= $2
                 AND possible_points > 0
                 AND earned_points >= possible_points
               ORDER BY date ASC"#,
        )
        .bind(user_id)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    pub async fn update_planning_field(
        pool: &SqlitePool,
        user_id: &str,
        date: NaiveDate,
        field: PlanningField,
        text: &str,
    ) -> Result<u64, sqlx::Error> {
        let sql = match field {
            PlanningField::MorningPlan => {
                r#"UPDATE focus_routines
                   SET morning_plan = $3, updated_at = datetime('now', 'subsec')
                   WHERE user_id = $1 AND date = $2"#
            }
            PlanningField::EveningReview => {
                r#"UPDATE focus_routines
                   SET evening_review = $3, updated_at = datetime('now', 'subsec')
                   WHERE user_id = $1 AND date = $2"#
            }
        };
        let result = sqlx::query(sql)
            .bind(user_id)
            .bind(date)
            .bind(text)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[tokio::test]
    async fn one_routine_per_user_per_day() {
        let db = DBService::new_in_memory().await.unwrap();
        let first = FocusRoutine::find_or_create(&db.pool, "alice", day(19)).await.unwrap();
        let again = FocusRoutine::find_or_create(&db.pool, "alice", day(19)).await.unwrap();
        let other_user = FocusRoutine::find_or_create(&db.pool, "bob", day(19)).await.unwrap();
        let next_day = FocusRoutine::find_or_create(&db.pool, "alice", day(20)).await.unwrap();

        assert_eq!(first.id, again.id);
        assert_ne!(first.id, other_user.id);
        assert_ne!(first.id, next_day.id);
        assert!(first.goals.iter().all(|g| !g.has_text() && !g.completed));
        assert!(first.completed_task_ids.is_empty());
    }

    #[tokio::test]
    async fn goals_and_completed_tasks_round_trip_through_storage() {
        let db = DBService::new_in_memory().await.unwrap();
        let routine = FocusRoutine::find_or_create(&db.pool, "alice", day(19)).await.unwrap();

        let goals = [
            FocusGoal {
                text: "Ship the report".to_string(),
                completed: true,
                difficulty: Difficulty::Hard,
            },
            FocusGoal::default(),
            FocusGoal {
                text: "Call mom".to_string(),
                completed: false,
                difficulty: Difficulty::Easy,
            },
        ];
        let task_ids: BTreeSet<Uuid> = [Uuid::new_v4(), Uuid::new_v4()].into_iter().collect();

        FocusRoutine::save_goals(&db.pool, "alice", routine.id, &goals).await.unwrap();
        FocusRoutine::save_completed_tasks(&db.pool, "alice", routine.id, &task_ids)
            .await
            .unwrap();
        FocusRoutine::save_score(&db.pool, "alice", routine.id, 30, 40).await.unwrap();

        let stored = FocusRoutine::find_by_date(&db.pool, "alice", day(19))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.goals, goals);
        assert_eq!(stored.completed_task_ids, task_ids);
        assert_eq!(stored.stored_progress_percent(), 75.0);
    }

    #[tokio::test]
    async fn writes_are_scoped_to_the_owner() {
        let db = DBService::new_in_memory().await.unwrap();
        let routine = FocusRoutine::find_or_create(&db.pool, "alice", day(19)).await.unwrap();
        let affected = FocusRoutine::save_goals(&db.pool, "mallory", routine.id, &Default::default())
            .await
            .unwrap();
        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn planning_fields_update_independently() {
        let db = DBService::new_in_memory().await.unwrap();
        FocusRoutine::find_or_create(&db.pool, "alice", day(19)).await.unwrap();
        FocusRoutine::update_planning_field(
            &db.pool,
            "alice",
            day(19),
            PlanningField::MorningPlan,
            "Deep work before noon",
        )
        .await
        .unwrap();

        let stored = FocusRoutine::find_by_date(&db.pool, "alice", day(19))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.morning_plan, "Deep work before noon");
        assert_eq!(stored.evening_review, "");
    }

    #[tokio::test]
    async fn completed_dates_need_every_possible_point() {
        let db = DBService::new_in_memory().await.unwrap();
        for (d, earned, possible) in [(3, 40, 40), (4, 30, 40), (5, 0, 0), (6, 60, 60), (9, 20, 20)] {
            let routine = FocusRoutine::find_or_create(&db.pool, "alice", day(d)).await.unwrap();
            FocusRoutine::save_score(&db.pool, "alice", routine.id, earned, possible)
                .await
                .unwrap();
        }

        let dates = FocusRoutine::find_completed_dates(&db.pool, "alice", day(8)).await.unwrap();
        assert_eq!(dates, vec![day(3), day(6)]);
        assert!(
            FocusRoutine::find_completed_dates(&db.pool, "bob", day(30))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn range_query_is_inclusive_and_ordered() {
        let db = DBService::new_in_memory().await.unwrap();
        for d in [21, 19, 20, 25] {
            FocusRoutine::find_or_create(&db.pool, "alice", day(d)).await.unwrap();
        }
        let routines = FocusRoutine::find_in_range(&db.pool, "alice", day(19), day(21))
            .await
            .unwrap();
        assert_eq!(
            routines.iter().map(|r| r.date).collect::<Vec<_>>(),
            vec![day(19), day(20), day(21)]
        );
    }

    #[test]
    fn difficulty_points_and_names() {
        assert_eq!(Difficulty::Easy.points(), 10);
        assert_eq!(Difficulty::Medium.points(), 20);
        assert_eq!(Difficulty::Hard.points(), 30);
        assert_eq!(Difficulty::Hard.to_string(), "hard");
        assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
    }
}
