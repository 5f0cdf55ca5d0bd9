//! Calendar-day arithmetic. Weeks start on Monday everywhere in the app.

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::Error;

/// Canonical external representation of a day, also used as a map key.
pub fn iso_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` string. Bad input yields `None`; callers drop the
/// update and keep their previous state.
pub fn parse_iso_day(iso: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(iso, "%Y-%m-%d").ok()
}

/// Strict variant for boundaries (fixture loading) where bad input should
/// surface instead of being swallowed.
pub fn parse_iso_day_strict(iso: &str) -> Result<NaiveDate, Error> {
    parse_iso_day(iso).ok_or_else(|| Error::InvalidDay(iso.to_owned()))
}

/// Monday of the week containing `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_monday() as i64)
}

/// 0 for Monday .. 6 for Sunday.
pub fn weekday_offset(day: NaiveDate) -> u32 {
    day.weekday().num_days_from_monday()
}

/// The seven days of the week starting at `start` (assumed to be a Monday).
pub fn week_days(start: NaiveDate) -> [NaiveDate; 7] {
    core::array::from_fn(|i| start + Duration::days(i as i64))
}

/// First day of the month containing `day`.
pub fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// First day of the month `delta` months away from `start` (a month start).
pub fn add_months(start: NaiveDate, delta: i32) -> NaiveDate {
    let months0 = start.year() * 12 + start.month0() as i32 + delta;
    let year = months0.div_euclid(12);
    let month0 = months0.rem_euclid(12) as u32;
    NaiveDate::from_ymd_opt(year, month0 + 1, 1).unwrap_or(start)
}

pub fn days_in_month(month: NaiveDate) -> u32 {
    let first = month_start(month);
    (add_months(first, 1) - first).num_days() as u32
}

/// Clamp a desired day-of-month into the given month's length.
pub fn clamp_day_in_month(month: NaiveDate, desired: u32) -> u32 {
    desired.clamp(1, days_in_month(month))
}

/// The day of `month` with the same day-of-month as `base`, clamped to the
/// month's length. This is the rule for carrying the selection across a
/// month swipe (March 31 -> April 30).
pub fn same_day_in_month(month: NaiveDate, base: NaiveDate) -> NaiveDate {
    let first = month_start(month);
    let day = clamp_day_in_month(first, base.day());
    NaiveDate::from_ymd_opt(first.year(), first.month(), day).unwrap_or(first)
}

/// The fixed 6x7 grid of days shown for a month, padded with the adjacent
/// months so every page has exactly 42 cells.
pub fn month_grid_days(month: NaiveDate) -> [NaiveDate; 42] {
    let grid_start = week_start(month_start(month));
    core::array::from_fn(|i| grid_start + Duration::days(i as i64))
}

/// Signed whole-day delta from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn d(iso: &str) -> NaiveDate {
        parse_iso_day(iso).unwrap()
    }

    #[test]
    fn iso_round_trip_and_rejects_garbage() {
        assert_eq!(iso_day(d("2024-06-10")), "2024-06-10");
        assert_eq!(parse_iso_day("2024-13-01"), None);
        assert_eq!(parse_iso_day("not-a-day"), None);
        assert_eq!(parse_iso_day(""), None);
    }

    #[test]
    fn week_starts_on_monday() {
        // 2024-06-10 is a Monday
        assert_eq!(week_start(d("2024-06-10")), d("2024-06-10"));
        assert_eq!(week_start(d("2024-06-13")), d("2024-06-10"));
        assert_eq!(week_start(d("2024-06-16")), d("2024-06-10"));
        assert_eq!(weekday_offset(d("2024-06-16")), 6);
    }

    #[test]
    fn month_arithmetic_crosses_years() {
        assert_eq!(add_months(d("2024-12-01"), 1), d("2025-01-01"));
        assert_eq!(add_months(d("2024-01-01"), -1), d("2023-12-01"));
        assert_eq!(add_months(d("2024-03-01"), -15), d("2022-12-01"));
        assert_eq!(days_in_month(d("2024-02-01")), 29);
        assert_eq!(days_in_month(d("2023-02-01")), 28);
    }

    #[test]
    fn day_of_month_clamps_to_target_length() {
        assert_eq!(same_day_in_month(d("2024-04-01"), d("2024-03-31")), d("2024-04-30"));
        assert_eq!(same_day_in_month(d("2024-05-01"), d("2024-04-30")), d("2024-05-30"));
        assert_eq!(same_day_in_month(d("2024-02-01"), d("2024-01-31")), d("2024-02-29"));
    }

    #[test]
    fn month_grid_is_42_cells_monday_first() {
        let grid = month_grid_days(d("2024-06-01"));
        assert_eq!(grid.len(), 42);
        // June 2024 starts on a Saturday; grid begins the preceding Monday.
        assert_eq!(grid[0], d("2024-05-27"));
        assert_eq!(grid[41], d("2024-07-07"));
        assert_eq!(weekday_offset(grid[0]), 0);
    }
}
