//! Due-date urgency of a long-term goal.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utils::time::days_between;

/// Goals due within this many days are "due soon"; the boundary day is included.
pub const DUE_SOON_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Urgency {
    Completed,
    OverdueBy { days: i64 },
    DueToday,
    DueSoon { days_remaining: i64 },
    Scheduled { date: NaiveDate, label: String },
}

/// Classifies a goal. First match wins: completed, overdue, today, soon, scheduled.
pub fn classify(due: NaiveDate, completed: bool, today: NaiveDate) -> Urgency {
    if completed {
        return Urgency::Completed;
    }

    let days_remaining = days_between(today, due);
    if days_remaining < 0 {
        Urgency::OverdueBy {
            days: -days_remaining,
        }
    } else if days_remaining == 0 {
        Urgency::DueToday
    } else if days_remaining <= DUE_SOON_DAYS {
        Urgency::DueSoon { days_remaining }
    } else {
        Urgency::Scheduled {
            date: due,
            label: due.format("%-d %B").to_string(),
        }
    }
}
