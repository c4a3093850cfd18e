//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use chrono::{Days, NaiveDate};
use fake::faker::company::en::{BsNoun, CompanyName};
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{format_date, SchemeCode};
use domain_fund::{FundMeta, NavPoint};

/// Builder for daily NAV series in upstream order (newest first)
pub struct SeriesBuilder {
    last: NaiveDate,
    days: u64,
    start_nav: Decimal,
    step: Decimal,
}

impl Default for SeriesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            last: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            days: 30,
            start_nav: dec!(10.00000),
            step: dec!(0.01250),
        }
    }

    /// Sets the newest date in the series
    pub fn ending(mut self, last: NaiveDate) -> Self {
        self.last = last;
        self
    }

    /// Sets the number of daily points
    pub fn days(mut self, days: u64) -> Self {
        self.days = days;
        self
    }

    /// Sets the NAV of the oldest point
    pub fn starting_nav(mut self, nav: Decimal) -> Self {
        self.start_nav = nav;
        self
    }

    /// Sets the daily NAV increment
    pub fn step(mut self, step: Decimal) -> Self {
        self.step = step;
        self
    }

    /// Builds the series, newest first, values with five decimals
    pub fn build(self) -> Vec<NavPoint> {
        (0..self.days)
            .map(|i| {
                let date = self.last - Days::new(i);
                let age = Decimal::from(self.days - 1 - i);
                let nav = (self.start_nav + self.step * age).round_dp(5);
                NavPoint::new(format_date(date), format!("{:.5}", nav))
            })
            .collect()
    }
}

/// Builder for fund metadata
pub struct FundMetaBuilder {
    meta: FundMeta,
}

impl Default for FundMetaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FundMetaBuilder {
    /// Creates a builder filled with random but plausible values
    pub fn new() -> Self {
        let house: String = CompanyName().fake();
        let theme: String = BsNoun().fake();
        let code: i64 = (100_000..200_000).fake();

        Self {
            meta: FundMeta::new(SchemeCode::new(code), format!("{} {} Fund - Direct Plan - Growth", house, theme))
                .with_fund_house(format!("{} Mutual Fund", house))
                .with_classification("Open Ended Schemes", "Equity Scheme - Flexi Cap Fund"),
        }
    }

    /// Sets the scheme code
    pub fn with_scheme_code(mut self, code: i64) -> Self {
        self.meta.scheme_code = SchemeCode::new(code);
        self
    }

    /// Sets the scheme name
    pub fn with_scheme_name(mut self, name: impl Into<String>) -> Self {
        self.meta.scheme_name = name.into();
        self
    }

    /// Sets the fund house
    pub fn with_fund_house(mut self, house: impl Into<String>) -> Self {
        self.meta.fund_house = house.into();
        self
    }

    /// Builds the metadata
    pub fn build(self) -> FundMeta {
        self.meta
    }
}
