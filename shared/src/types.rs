//! Common types used across the platform

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive date range for report queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Open bounds fall back to a range wide enough to cover all workshop
    /// records while staying inside what Postgres can store as a DATE.
    pub fn from_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            start: start.unwrap_or_else(|| {
                NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
            }),
            end: end.unwrap_or_else(|| {
                NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX)
            }),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_range_stays_inside_postgres_dates() {
        let range = DateRange::from_bounds(None, None);
        assert_eq!(range.start, NaiveDate::from_ymd_opt(1900, 1, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(9999, 12, 31).unwrap());
        assert!(range.is_valid());
    }

    #[test]
    fn reversed_range_is_invalid() {
        let range = DateRange::from_bounds(
            NaiveDate::from_ymd_opt(2024, 5, 1),
            NaiveDate::from_ymd_opt(2024, 4, 1),
        );
        assert!(!range.is_valid());
    }
}
