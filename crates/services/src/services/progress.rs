//! Data behind the progress charts, achievements and the dashboard.
//!
//! A day is complete when its stored score earned every possible point. Streaks
//! count consecutive complete days.

use std::collections::BTreeSet;

use chrono::{Months, NaiveDate};
use db::models::{
    focus_routine::FocusRoutine, journal_entry::JournalEntry, long_term_goal::LongTermGoal,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use ts_rs::TS;
use utils::time::trailing_month_starts;

use super::{
    goals::{GoalWithUrgency, with_urgency},
    routine::{RoutineError, RoutineService},
    scoring::DailyScore,
};

/// Goals shown in the dashboard's "coming up" list.
pub const UPCOMING_GOALS: usize = 3;
pub const MAX_MONTHS: u32 = 24;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Routine(#[from] RoutineError),
}

/// Average daily progress over the days of one month that have a routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct MonthlyDiscipline {
    pub month: NaiveDate,
    pub label: String,
    pub average_percent: f64,
    pub days_tracked: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Dashboard {
    pub today: DailyScore,
    pub streak_days: u32,
    pub active_goals: usize,
    pub upcoming: Vec<GoalWithUrgency>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    /// First complete day.
    InTheArena,
    /// Seven complete days, not necessarily consecutive.
    FirstWeek,
    /// Twenty-one complete days in a row.
    FocusWarrior,
    /// Thirty journal entries.
    IronMind,
}

impl AchievementKind {
    pub const ALL: [AchievementKind; 4] = [
        AchievementKind::InTheArena,
        AchievementKind::FirstWeek,
        AchievementKind::FocusWarrior,
        AchievementKind::IronMind,
    ];

    pub fn target(self) -> u32 {
        match self {
            AchievementKind::InTheArena => 1,
            AchievementKind::FirstWeek => 7,
            AchievementKind::FocusWarrior => 21,
            AchievementKind::IronMind => 30,
        }
    }

    fn title(self) -> &'static str {
        match self {
            AchievementKind::InTheArena => "In the Arena",
            AchievementKind::FirstWeek => "First Week",
            AchievementKind::FocusWarrior => "Focus Warrior",
            AchievementKind::IronMind => "Iron Mind",
        }
    }

    fn description(self) -> &'static str {
        match self {
            AchievementKind::InTheArena => "First day completed.",
            AchievementKind::FirstWeek => "7 days of complete routine.",
            AchievementKind::FocusWarrior => "21 days in a row without failing.",
            AchievementKind::IronMind => "30 nightly reflections.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct Achievement {
    pub kind: AchievementKind,
    pub title: String,
    pub description: String,
    /// Capped at `target`.
    pub progress: u32,
    pub target: u32,
    pub unlocked: bool,
}

impl Achievement {
    fn new(kind: AchievementKind, progress: u32) -> Self {
        let target = kind.target();
        Self {
            kind,
            title: kind.title().to_string(),
            description: kind.description().to_string(),
            progress: progress.min(target),
            target,
            unlocked: progress >= target,
        }
    }
}

#[derive(Clone)]
pub struct ProgressService {
    pool: SqlitePool,
    routine: RoutineService,
}

impl ProgressService {
    pub fn new(pool: SqlitePool, routine: RoutineService) -> Self {
        Self { pool, routine }
    }

    /// One bar per month for the `months` months ending with the current one,
    /// oldest first. `months` is capped at [`MAX_MONTHS`].
    pub async fn monthly(
        &self,
        user_id: &str,
        months: u32,
        today: NaiveDate,
    ) -> Result<Vec<MonthlyDiscipline>, ProgressError> {
        let starts = trailing_month_starts(today, months.min(MAX_MONTHS));
        let Some(&first) = starts.first() else {
            return Ok(Vec::new());
        };
        let routines = FocusRoutine::find_in_range(&self.pool, user_id, first, today).await?;

        Ok(starts
            .into_iter()
            .map(|start| {
                let end = start.checked_add_months(Months::new(1));
                let percents: Vec<f64> = routines
                    .iter()
                    .filter(|r| r.date >= start && end.is_none_or(|end| r.date < end))
                    .map(FocusRoutine::stored_progress_percent)
                    .collect();
                let average_percent = if percents.is_empty() {
                    0.0
                } else {
                    percents.iter().sum::<f64>() / percents.len() as f64
                };
                MonthlyDiscipline {
                    month: start,
                    label: start.format("%B %Y").to_string(),
                    average_percent,
                    days_tracked: percents.len(),
                }
            })
            .collect())
    }

    pub async fn dashboard(&self, user_id: &str, today: NaiveDate) -> Result<Dashboard, ProgressError> {
        let (score, completed) = self.completed_days(user_id, today).await?;
        let active: Vec<LongTermGoal> = LongTermGoal::find_all(&self.pool, user_id)
            .await?
            .into_iter()
            .filter(|goal| !goal.completed)
            .collect();

        Ok(Dashboard {
            today: score,
            streak_days: current_streak(&completed, today),
            active_goals: active.len(),
            upcoming: active
                .into_iter()
                .take(UPCOMING_GOALS)
                .map(|goal| with_urgency(goal, today))
                .collect(),
        })
    }

    /// Every achievement with the user's progress towards it.
    pub async fn achievements(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<Achievement>, ProgressError> {
        let (_, completed) = self.completed_days(user_id, today).await?;
        let complete_days = u32::try_from(completed.len()).unwrap_or(u32::MAX);
        let longest = longest_streak(&completed);
        let reflections =
            u32::try_from(JournalEntry::count(&self.pool, user_id).await?).unwrap_or(u32::MAX);

        Ok(AchievementKind::ALL
            .into_iter()
            .map(|kind| {
                let progress = match kind {
                    AchievementKind::InTheArena | AchievementKind::FirstWeek => complete_days,
                    AchievementKind::FocusWarrior => longest,
                    AchievementKind::IronMind => reflections,
                };
                Achievement::new(kind, progress)
            })
            .collect())
    }

    /// Today's live score and every complete day up to today. Reading the day
    /// refreshes today's stored snapshot first.
    async fn completed_days(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<(DailyScore, BTreeSet<NaiveDate>), ProgressError> {
        let day = self.routine.day(user_id, today).await?;
        let mut completed: BTreeSet<NaiveDate> =
            FocusRoutine::find_completed_dates(&self.pool, user_id, today)
                .await?
                .into_iter()
                .collect();
        if day.score.is_perfect() {
            completed.insert(today);
        } else {
            completed.remove(&today);
        }
        Ok((day.score, completed))
    }
}

/// Consecutive complete days ending today. An unfinished today does not break a
/// streak that ran through yesterday.
pub fn current_streak(completed: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let start = if completed.contains(&today) {
        Some(today)
    } else {
        today.pred_opt()
    };
    let mut streak = 0;
    let mut cursor = start;
    while let Some(day) = cursor.filter(|day| completed.contains(day)) {
        streak += 1;
        cursor = day.pred_opt();
    }
    streak
}

/// Longest run of consecutive complete days.
pub fn longest_streak(completed: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for &day in completed {
        run = if previous.and_then(|p| p.succ_opt()) == Some(day) {
            run + 1
        } else {
            1
        };
        longest = longest.max(run);
        previous = Some(day);
    }
    longest
}
