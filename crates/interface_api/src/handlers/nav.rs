//! NAV lookup handler

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use tracing::debug;

use domain_fund::NavResponse;

use crate::dto::NavQuery;
use crate::error::ApiError;
use crate::AppState;

/// Looks up a fund's NAV history
///
/// A started backfill is handed to the state's task tracker, so the reply
/// goes out without waiting for the writes.
pub async fn get_nav(
    State(state): State<AppState>,
    query: Result<Query<NavQuery>, QueryRejection>,
) -> Result<Json<NavResponse>, ApiError> {
    let Query(query) = query?;

    let lookup = state
        .service
        .lookup(query.identifier(), query.start.as_deref(), query.end.as_deref())
        .await?;

    debug!(source = ?lookup.source, records = lookup.response.data.len(), "Lookup served");

    if let Some(handle) = lookup.backfill {
        state.backfills.spawn(handle.wait());
    }

    Ok(Json(lookup.response))
}
