//! Request validation
//!
//! Turns the raw query values into a scheme code and an optional window.
//! Pure: no store or network access happens before this succeeds.

use chrono::{NaiveDate, Utc};

use core_kernel::{parse_date, DateWindow, SchemeCode, SchemeCodeError};
use crate::error::FundError;

pub const MSG_ID_REQUIRED: &str = "mutualFundID query parameter is required";
pub const MSG_ID_NOT_INTEGER: &str = "mutualFundID must be an integer";
pub const MSG_BOTH_DATES: &str = "both start and end dates are required in the format dd-mm-yyyy";
pub const MSG_BAD_START: &str = "invalid start date format. use dd-mm-yyyy";
pub const MSG_BAD_END: &str = "invalid end date format. use dd-mm-yyyy";
pub const MSG_FUTURE_END: &str = "end date cannot be in the future";
pub const MSG_START_AFTER_END: &str = "start date cannot be after end date";

/// A request that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub scheme_code: SchemeCode,
    /// `None` means all history
    pub window: Option<DateWindow>,
}

/// Validates a request against today's UTC date
pub fn validate_request(
    raw_code: &str,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<ValidatedRequest, FundError> {
    validate_request_at(raw_code, start, end, Utc::now().date_naive())
}

/// Validates a request against an explicit "today"
///
/// Empty strings count as absent, so `?start=&end=` means no window.
pub fn validate_request_at(
    raw_code: &str,
    start: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
) -> Result<ValidatedRequest, FundError> {
    let scheme_code = raw_code.parse::<SchemeCode>().map_err(|e| match e {
        SchemeCodeError::Empty => FundError::invalid_request(MSG_ID_REQUIRED),
        SchemeCodeError::NotAnInteger(_) => FundError::invalid_request(MSG_ID_NOT_INTEGER),
    })?;

    let window = validate_window(
        start.filter(|s| !s.is_empty()),
        end.filter(|s| !s.is_empty()),
        today,
    )?;

    Ok(ValidatedRequest { scheme_code, window })
}

fn validate_window(
    start: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
) -> Result<Option<DateWindow>, FundError> {
    let (start, end) = match (start, end) {
        (None, None) => return Ok(None),
        (Some(start), Some(end)) => (start, end),
        _ => return Err(FundError::invalid_request(MSG_BOTH_DATES)),
    };

    let start = parse_date(start).map_err(|_| FundError::invalid_request(MSG_BAD_START))?;
    let end = parse_date(end).map_err(|_| FundError::invalid_request(MSG_BAD_END))?;

    if end > today {
        return Err(FundError::invalid_request(MSG_FUTURE_END));
    }

    DateWindow::new(start, end)
        .map(Some)
        .map_err(|_| FundError::invalid_request(MSG_START_AFTER_END))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn message(result: Result<ValidatedRequest, FundError>) -> String {
        match result {
            Err(FundError::InvalidRequest(msg)) => msg,
            other => panic!("expected InvalidRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_no_dates_means_no_window() {
        let request = validate_request_at("120503", None, None, today()).unwrap();
        assert_eq!(request.scheme_code, SchemeCode::new(120503));
        assert!(request.window.is_none());
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let request = validate_request_at("120503", Some(""), Some(""), today()).unwrap();
        assert!(request.window.is_none());
    }

    #[test]
    fn test_identifier_checked_first() {
        assert_eq!(message(validate_request_at("", None, None, today())), MSG_ID_REQUIRED);
        assert_eq!(
            message(validate_request_at("abc", Some("01-01-2020"), None, today())),
            MSG_ID_NOT_INTEGER
        );
    }

    #[test]
    fn test_date_errors() {
        assert_eq!(
            message(validate_request_at("1", Some("01-01-2020"), None, today())),
            MSG_BOTH_DATES
        );
        assert_eq!(
            message(validate_request_at("1", Some("2020-01-01"), Some("31-12-2020"), today())),
            MSG_BAD_START
        );
        assert_eq!(
            message(validate_request_at("1", Some("01-01-2020"), Some("31/12/2020"), today())),
            MSG_BAD_END
        );
        assert_eq!(
            message(validate_request_at("1", Some("1-1-2020"), Some("31-12-2020"), today())),
            MSG_BAD_START
        );
        assert_eq!(
            message(validate_request_at("1", Some("01-01-2020"), Some("31-1-2020"), today())),
            MSG_BAD_END
        );
        assert_eq!(
            message(validate_request_at("1", Some("01-07-2024"), Some("02-07-2024"), today())),
            MSG_FUTURE_END
        );
        assert_eq!(
            message(validate_request_at("1", Some("02-01-2020"), Some("01-01-2020"), today())),
            MSG_START_AFTER_END
        );
    }

    #[test]
    fn test_end_may_be_today() {
        let request = validate_request_at("1", Some("01-06-2024"), Some("30-06-2024"), today()).unwrap();
        assert!(request.window.is_some());
    }
}
