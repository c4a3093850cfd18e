//! Calendar date handling for NAV series
//!
//! Every date that crosses a boundary (query string, upstream payload,
//! response body) uses the fixed `dd-mm-yyyy` textual form.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The one textual date format used on every boundary
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid date '{0}': expected dd-mm-yyyy")]
    InvalidDate(String),

    #[error("Invalid window: start {start} is after end {end}")]
    InvalidWindow {
        start: String,
        end: String,
    },
}

/// Parses a `dd-mm-yyyy` date
///
/// Day and month must be zero-padded: `1-1-2020` is rejected.
pub fn parse_date(value: &str) -> Result<NaiveDate, TemporalError> {
    let invalid = || TemporalError::InvalidDate(value.to_string());

    if !has_padded_shape(value.as_bytes()) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())
}

/// `dd-mm-yyyy`: ten bytes, dashes at 2 and 5, digits elsewhere
fn has_padded_shape(bytes: &[u8]) -> bool {
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Formats a date as `dd-mm-yyyy`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// A closed date interval `[start, end]`
///
/// An absent window (`Option::None` at the call sites) means "all history".
/// Deserialization goes through [`DateWindow::new`], so `start > end` is
/// rejected there too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WindowBounds")]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct WindowBounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<WindowBounds> for DateWindow {
    type Error = TemporalError;

    fn try_from(bounds: WindowBounds) -> Result<Self, Self::Error> {
        Self::new(bounds.start, bounds.end)
    }
}

impl DateWindow {
    /// Creates a window, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start > end {
            return Err(TemporalError::InvalidWindow {
                start: format_date(start),
                end: format_date(end),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Checks whether a date lies inside the window (both ends inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Human-readable period, e.g. `01-01-2020 to 31-12-2020`
    pub fn period_label(&self) -> String {
        format!("{} to {}", format_date(self.start), format_date(self.end))
    }
}
