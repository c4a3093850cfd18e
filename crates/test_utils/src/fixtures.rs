//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the NAV cache. These fixtures are
//! consistent and predictable for unit and integration tests.

use chrono::NaiveDate;
use core_kernel::{DateWindow, SchemeCode};
use domain_fund::{FundMeta, NavPoint, UpstreamHistory};

use crate::builders::SeriesBuilder;

/// Fixture for fund metadata
pub struct FundFixtures;

impl FundFixtures {
    /// Scheme code of the reference fund
    pub fn axis_code() -> SchemeCode {
        SchemeCode::new(120503)
    }

    /// Metadata as the upstream source reports it for 120503
    pub fn axis_meta() -> FundMeta {
        FundMeta::new(Self::axis_code(), "Axis ELSS Tax Saver Fund - Direct Plan - Growth")
            .with_fund_house("Axis Mutual Fund")
            .with_classification("Open Ended Schemes", "Equity Scheme - ELSS")
    }

    /// A scheme code no upstream knows
    pub fn unknown_code() -> SchemeCode {
        SchemeCode::new(999999999)
    }
}

/// Fixture for NAV series
pub struct SeriesFixtures;

impl SeriesFixtures {
    /// Last date of the reference history
    pub fn last_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, 31).unwrap()
    }

    /// 800 daily points ending 31-03-2021, newest first
    ///
    /// Covers every day of 2020.
    pub fn axis_history() -> Vec<NavPoint> {
        SeriesBuilder::new()
            .ending(Self::last_date())
            .days(800)
            .build()
    }

    /// Upstream payload for the reference fund
    pub fn axis_payload() -> UpstreamHistory {
        UpstreamHistory {
            meta: FundFixtures::axis_meta(),
            data: Self::axis_history(),
        }
    }

    /// A short history with one malformed date and one malformed value
    pub fn with_malformed_entries() -> Vec<NavPoint> {
        vec![
            NavPoint::new("05-01-2020", "10.5"),
            NavPoint::new("2020-01-04", "10.4"),
            NavPoint::new("03-01-2020", "N.A."),
            NavPoint::new("02-01-2020", "10.2"),
        ]
    }
}

/// Fixture for request windows
pub struct WindowFixtures;

impl WindowFixtures {
    /// Calendar year 2020, inclusive
    pub fn year_2020() -> DateWindow {
        DateWindow::new(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
        )
        .unwrap()
    }

    /// Single-day window
    pub fn single_day(date: NaiveDate) -> DateWindow {
        DateWindow::new(date, date).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_history_covers_2020() {
        let history = SeriesFixtures::axis_history();
        let window = WindowFixtures::year_2020();
        let inside = history
            .iter()
            .filter(|p| p.parse_date().map(|d| window.contains(d)).unwrap_or(false))
            .count();
        assert_eq!(inside, 366);
    }

    #[test]
    fn test_axis_meta_is_not_empty() {
        assert!(!FundFixtures::axis_meta().is_empty());
    }
}
