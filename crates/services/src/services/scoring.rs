//! Discipline points for a single day.

use std::collections::BTreeSet;

use db::models::{focus_routine::FocusGoal, routine_task::RoutineTask};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
pub struct DailyScore {
    pub earned_points: u32,
    pub possible_points: u32,
    /// `earned / possible * 100`, or 0 when nothing is possible.
    pub progress_percent: f64,
    pub completed_count: usize,
    pub total_count: usize,
}

impl DailyScore {
    pub fn is_perfect(&self) -> bool {
        self.possible_points > 0 && self.earned_points == self.possible_points
    }
}

/// Scores a day from its tasks, the ids completed that day and the focus goals.
///
/// Every task is eligible. A goal is eligible only when it has text; an empty
/// slot counts for nothing even if it is flagged completed. Completed ids that
/// match no task are ignored, so `earned_points <= possible_points` always holds.
pub fn score_day(
    tasks: &[RoutineTask],
    completed_task_ids: &BTreeSet<Uuid>,
    goals: &[FocusGoal],
) -> DailyScore {
    let mut earned_points = 0u32;
    let mut possible_points = 0u32;
    let mut completed_count = 0usize;
    let mut total_count = 0usize;

    for task in tasks {
        let points = u32::try_from(task.points).unwrap_or(0);
        possible_points += points;
        total_count += 1;
        if completed_task_ids.contains(&task.id) {
            earned_points += points;
            completed_count += 1;
        }
    }

    for goal in goals.iter().filter(|g| g.has_text()) {
        let points = goal.difficulty.points();
        possible_points += points;
        total_count += 1;
        if goal.completed {
            earned_points += points;
            completed_count += 1;
        }
    }

    let progress_percent = if possible_points == 0 {
        0.0
    } else {
        f64::from(earned_points) / f64::from(possible_points) * 100.0
    };

    DailyScore {
        earned_points,
        possible_points,
        progress_percent,
        completed_count,
        total_count,
    }
}
