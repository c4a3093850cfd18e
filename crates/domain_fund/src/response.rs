//! Outward response shape

use serde::{Deserialize, Serialize};

use core_kernel::DateWindow;
use crate::fund::FundMeta;
use crate::nav::NavPoint;

/// Body returned to callers for a successful lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavResponse {
    pub meta: FundMeta,
    /// `"dd-mm-yyyy to dd-mm-yyyy"`, present only for windowed requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    pub data: Vec<NavPoint>,
}

/// Builds the response from metadata and an already-filtered series
pub fn assemble(meta: FundMeta, data: Vec<NavPoint>, window: Option<&DateWindow>) -> NavResponse {
    NavResponse {
        meta,
        period: window.map(DateWindow::period_label),
        data,
    }
}
