//! Fund domain errors

use thiserror::Error;

use core_kernel::SchemeCode;

/// Errors a NAV lookup can end in
///
/// Every variant is caller-facing and renders as a single message. Failures
/// during backfill never become a `FundError`; they are only logged.
#[derive(Debug, Error)]
pub enum FundError {
    /// Bad or missing identifier, malformed or contradictory dates
    #[error("{0}")]
    InvalidRequest(String),

    /// The upstream source answered but does not know the scheme
    #[error("invalid mutual fund ID {0}")]
    InvalidIdentifier(SchemeCode),

    /// Network or decoding failure talking to the upstream source
    #[error("something went wrong while fetching data from upstream: {0}")]
    Upstream(String),

    /// The store was chosen as the source but could not be read
    #[error("something went wrong while fetching data from the store: {0}")]
    StoreRead(String),
}

impl FundError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        FundError::InvalidRequest(message.into())
    }

    /// Whether the failure was caused by the caller's input
    pub fn is_user_error(&self) -> bool {
        matches!(self, FundError::InvalidRequest(_) | FundError::InvalidIdentifier(_))
    }

    /// Whether retrying the whole request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, FundError::Upstream(_) | FundError::StoreRead(_))
    }
}
