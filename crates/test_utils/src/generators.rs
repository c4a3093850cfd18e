//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{format_date, DateWindow, SchemeCode};
use domain_fund::NavPoint;

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
}

/// Strategy for dates between 2000-01-01 and roughly 2027
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..10_000).prop_map(|days| epoch() + Duration::days(days))
}

/// Strategy for valid scheme codes
pub fn scheme_code_strategy() -> impl Strategy<Value = SchemeCode> {
    (1i64..1_000_000).prop_map(SchemeCode::new)
}

/// Strategy for raw identifier strings that are not integers
pub fn non_integer_identifier_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z]{1,10}",
        "[0-9]{1,5}\\.[0-9]{1,3}",
        "[0-9]{1,4}[a-z]{1,3}",
    ]
}

/// Strategy for valid NAV values (0.0001 to 9999.9999)
pub fn nav_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|n| Decimal::new(n, 4))
}

/// Strategy for ordered, non-empty windows
pub fn window_strategy() -> impl Strategy<Value = DateWindow> {
    (date_strategy(), 0i64..2_000).prop_filter_map("window past range", |(start, span)| {
        DateWindow::new(start, start + Duration::days(span)).ok()
    })
}

/// Strategy for daily series, newest first, with unique dates
pub fn series_strategy(max_len: usize) -> impl Strategy<Value = Vec<NavPoint>> {
    (date_strategy(), prop::collection::vec(nav_strategy(), 0..=max_len)).prop_map(|(last, navs)| {
        navs.into_iter()
            .enumerate()
            .map(|(i, nav)| NavPoint::new(format_date(last - Duration::days(i as i64)), nav.to_string()))
            .collect()
    })
}
