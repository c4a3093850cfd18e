//! Net Asset Value observations
//!
//! Three shapes of the same observation:
//! - [`NavPoint`]: the wire form (`{"date": "dd-mm-yyyy", "nav": "12.3456"}`)
//!   used by the upstream payload, the filter, and the response body
//! - [`NavEntry`]: a parsed point ready to be written for a known fund
//! - [`NavRecord`]: a stored row with its surrogate key

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{format_date, parse_date, FundKey, NavRecordKey, TemporalError};

/// Fractional digits used when rendering a stored NAV
pub const NAV_DISPLAY_SCALE: u32 = 4;

/// Formats a NAV with [`NAV_DISPLAY_SCALE`] fractional digits
pub fn format_nav(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(NAV_DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.4}", rounded)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavParseError {
    #[error("invalid NAV date '{0}'")]
    Date(String),

    #[error("invalid NAV value '{0}'")]
    Value(String),
}

/// One observation in transit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavPoint {
    pub date: String,
    pub nav: String,
}

impl NavPoint {
    pub fn new(date: impl Into<String>, nav: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            nav: nav.into(),
        }
    }

    /// Parses the `dd-mm-yyyy` date
    pub fn parse_date(&self) -> Result<NaiveDate, TemporalError> {
        parse_date(&self.date)
    }
}

/// A parsed observation awaiting insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavEntry {
    pub nav_date: NaiveDate,
    pub nav: Decimal,
}

impl TryFrom<&NavPoint> for NavEntry {
    type Error = NavParseError;

    fn try_from(point: &NavPoint) -> Result<Self, Self::Error> {
        let nav_date = point
            .parse_date()
            .map_err(|_| NavParseError::Date(point.date.clone()))?;
        let nav = Decimal::from_str(point.nav.trim())
            .map_err(|_| NavParseError::Value(point.nav.clone()))?;
        Ok(Self { nav_date, nav })
    }
}

/// A stored observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavRecord {
    pub id: NavRecordKey,
    pub fund_id: FundKey,
    pub nav_date: NaiveDate,
    pub nav: Decimal,
}

impl NavRecord {
    /// Renders the record in wire form
    pub fn to_point(&self) -> NavPoint {
        NavPoint {
            date: format_date(self.nav_date),
            nav: format_nav(self.nav),
        }
    }
}
