//! Calendar helpers. Everything here works on whole days, never elapsed hours.

use chrono::{Datelike, Local, Months, NaiveDate};

/// The current calendar day in the server's local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Whole calendar days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First days of the `count` months ending with the month of `today`, oldest first.
pub fn trailing_month_starts(today: NaiveDate, count: u32) -> Vec<NaiveDate> {
    let current = month_start(today);
    (0..count)
        .rev()
        .filter_map(|back| current.checked_sub_months(Months::new(back)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn days_between_counts_calendar_days() {
        assert_eq!(days_between(date(2026, 3, 1), date(2026, 3, 8)), 7);
        assert_eq!(days_between(date(2026, 3, 1), date(2026, 2, 28)), -1);
        assert_eq!(days_between(date(2026, 3, 1), date(2026, 3, 1)), 0);
    }

    #[test]
    fn trailing_months_cross_year_boundary() {
        let months = trailing_month_starts(date(2026, 2, 17), 3);
        assert_eq!(months, vec![date(2025, 12, 1), date(2026, 1, 1), date(2026, 2, 1)]);
    }

    #[test]
    fn zero_months_is_empty() {
        assert!(trailing_month_starts(date(2026, 2, 17), 0).is_empty());
    }
}
