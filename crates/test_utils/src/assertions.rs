//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for NAV series that give
//! more meaningful error messages than standard assertions.

use chrono::NaiveDate;

use core_kernel::DateWindow;
use domain_fund::{NavPoint, NavResponse};

fn parsed(point: &NavPoint) -> NaiveDate {
    point
        .parse_date()
        .unwrap_or_else(|_| panic!("Unparseable date in series: {:?}", point))
}

/// Asserts that a series is strictly newest-first
///
/// # Panics
///
/// Panics on the first pair of points that is not in descending date order
pub fn assert_newest_first(series: &[NavPoint]) {
    for pair in series.windows(2) {
        assert!(
            parsed(&pair[0]) > parsed(&pair[1]),
            "Series not newest-first: {} came before {}",
            pair[0].date,
            pair[1].date
        );
    }
}

/// Asserts that every point lies inside the window
pub fn assert_within_window(series: &[NavPoint], window: &DateWindow) {
    for point in series {
        assert!(
            window.contains(parsed(point)),
            "Point {} outside window {}",
            point.date,
            window.period_label()
        );
    }
}

/// Asserts that every NAV is rendered with exactly `scale` fractional digits
pub fn assert_nav_scale(series: &[NavPoint], scale: usize) {
    for point in series {
        let digits = point.nav.split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0);
        assert_eq!(
            digits, scale,
            "NAV {} on {} has {} fractional digits, expected {}",
            point.nav, point.date, digits, scale
        );
    }
}

/// Asserts the `period` field matches the window (or is absent without one)
pub fn assert_period(response: &NavResponse, window: Option<&DateWindow>) {
    assert_eq!(
        response.period,
        window.map(DateWindow::period_label),
        "Unexpected period field"
    );
}
