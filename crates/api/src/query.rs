//! Shared query parameter types for API handlers.

use agendas_core::calendar::{month_start, parse_month};
use agendas_core::types::Day;
use serde::Deserialize;

use crate::error::AppResult;

/// `?month=YYYY-MM`. Absent means the month of `today`.
#[derive(Debug, Default, Deserialize)]
pub struct MonthParams {
    pub month: Option<String>,
}

impl MonthParams {
    /// First day of the requested month.
    pub fn resolve(&self, today: Day) -> AppResult<Day> {
        match self.month.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Ok(parse_month(raw)?),
            _ => Ok(month_start(today)),
        }
    }
}

/// Today in UTC.
pub fn today() -> Day {
    chrono::Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn month_defaults_to_current() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();
        let params = MonthParams::default();
        assert_eq!(params.resolve(today).unwrap(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn explicit_month_is_parsed() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();
        let params = MonthParams {
            month: Some("2023-11".to_string()),
        };
        assert_eq!(params.resolve(today).unwrap(), NaiveDate::from_ymd_opt(2023, 11, 1).unwrap());
        let bad = MonthParams {
            month: Some("11/2023".to_string()),
        };
        assert!(bad.resolve(today).is_err());
    }
}
