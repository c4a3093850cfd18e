//! NAV lookup DTOs

use serde::Deserialize;

/// Query string of a NAV lookup
///
/// All fields are optional at this layer so that a missing identifier is
/// reported with the same message as an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NavQuery {
    #[serde(rename = "mutualFundID")]
    pub mutual_fund_id: Option<String>,
    /// `dd-mm-yyyy`
    pub start: Option<String>,
    /// `dd-mm-yyyy`
    pub end: Option<String>,
}

impl NavQuery {
    pub fn identifier(&self) -> &str {
        self.mutual_fund_id.as_deref().unwrap_or("")
    }
}
