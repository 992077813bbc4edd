//! Calendar arithmetic for the scheduling grid and the analytics.
//!
//! Everything here works on [`Day`] values (no time component, no time
//! zone). A business day is any day that is not a Saturday or a Sunday;
//! holidays are not modelled.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Day;

/// Number of columns shown by the `day` zoom level.
pub const DAY_VIEW_COLUMNS: u64 = 7;

// ---------------------------------------------------------------------------
// Day predicates
// ---------------------------------------------------------------------------

/// True for Monday through Friday.
pub fn is_business_day(day: Day) -> bool {
    !matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

/// True when both days fall in the same calendar month of the same year.
pub fn same_month(a: Day, b: Day) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

// ---------------------------------------------------------------------------
// Ranges
// ---------------------------------------------------------------------------

/// Every calendar day in `[start, end]`, inclusive. Empty when `end < start`.
pub fn days_inclusive(start: Day, end: Day) -> Vec<Day> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Count of business days in `[start, end]`, inclusive.
pub fn business_days(start: Day, end: Day) -> i64 {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_business_day(*d))
        .count() as i64
}

// ---------------------------------------------------------------------------
// Months
// ---------------------------------------------------------------------------

/// First day of the month containing `day`.
pub fn month_start(day: Day) -> Day {
    day.with_day(1).unwrap_or(day)
}

/// Last day of the month containing `day`.
pub fn month_end(day: Day) -> Day {
    month_start(day) + Months::new(1) - Days::new(1)
}

/// Business days in the month containing `day`.
pub fn business_days_in_month(day: Day) -> i64 {
    business_days(month_start(day), month_end(day))
}

/// Shift `day` by a signed number of months, clamping the day-of-month
/// (e.g. 31 Jan + 1 month = 29 Feb in a leap year).
pub fn add_months(day: Day, months: i32) -> Day {
    if months >= 0 {
        day + Months::new(months.unsigned_abs())
    } else {
        day - Months::new(months.unsigned_abs())
    }
}

/// First days of the `count` months ending at (and including) `reference`'s
/// month, oldest first.
pub fn months_ending_at(reference: Day, count: u32) -> Vec<Day> {
    let start = month_start(reference);
    (0..count)
        .rev()
        .map(|back| add_months(start, -(back as i32)))
        .collect()
}

/// First days of the `count` months strictly after `reference`'s month.
pub fn months_after(reference: Day, count: u32) -> Vec<Day> {
    let start = month_start(reference);
    (1..=count).map(|ahead| add_months(start, ahead as i32)).collect()
}

/// Parse a `YYYY-MM` month reference into the first day of that month.
pub fn parse_month(value: &str) -> Result<Day, CoreError> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d")
        .map_err(|_| CoreError::validation(format!("Invalid month '{value}'. Expected YYYY-MM")))
}

/// Format the month of `day` as `YYYY-MM`.
pub fn format_month(day: Day) -> String {
    day.format("%Y-%m").to_string()
}

// ---------------------------------------------------------------------------
// Grid zoom levels
// ---------------------------------------------------------------------------

/// Zoom level of the scheduling grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeView {
    /// Seven consecutive days starting at the anchor.
    Day,
    /// The Monday-to-Sunday week containing the anchor.
    #[default]
    Week,
    /// Every day of the anchor's month.
    Month,
}

/// Monday of the week containing `day`.
pub fn week_start(day: Day) -> Day {
    day - Days::new(u64::from(day.weekday().num_days_from_monday()))
}

/// The column days rendered for `view` around `anchor`.
pub fn time_columns(view: TimeView, anchor: Day) -> Vec<Day> {
    match view {
        TimeView::Day => days_inclusive(anchor, anchor + Days::new(DAY_VIEW_COLUMNS - 1)),
        TimeView::Week => {
            let start = week_start(anchor);
            days_inclusive(start, start + Days::new(6))
        }
        TimeView::Month => days_inclusive(month_start(anchor), month_end(anchor)),
    }
}

/// Move the grid anchor `steps` pages forward (negative = backward).
///
/// Both the `day` and `week` zoom levels page by whole weeks; `month` pages
/// by calendar months.
pub fn shift_anchor(view: TimeView, anchor: Day, steps: i32) -> Day {
    match view {
        TimeView::Day | TimeView::Week => {
            let days = u64::from(steps.unsigned_abs()) * 7;
            if steps >= 0 {
                anchor + Days::new(days)
            } else {
                anchor - Days::new(days)
            }
        }
        TimeView::Month => add_months(anchor, steps),
    }
}
