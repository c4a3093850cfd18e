//! Read-through NAV lookup
//!
//! `NavService` answers a lookup from the store when the fund is fully cached and
//! from the upstream source otherwise. On a miss the response is built first
//! and the full, unfiltered history is then handed to the backfill pipeline.
//! The returned [`NavLookup`] carries the backfill handle so the host can
//! wait for it after replying.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use core_kernel::{PortError, SchemeCode};

use crate::backfill::{BackfillConfig, BackfillHandle, BackfillPipeline};
use crate::error::FundError;
use crate::filter::filter_series;
use crate::ports::{CacheProbe, NavStore, UpstreamSource};
use crate::response::{assemble, NavResponse};
use crate::validation::{validate_request, ValidatedRequest};

/// Where a lookup's data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    /// Served from the store
    Store,
    /// Cache miss, served from upstream
    Upstream,
    /// Store unreachable, served from upstream
    UpstreamDegraded,
}

/// Result of a successful lookup
#[derive(Debug)]
pub struct NavLookup {
    pub response: NavResponse,
    pub source: LookupSource,
    /// Present when a backfill was started
    pub backfill: Option<BackfillHandle>,
}

/// Request orchestrator
#[derive(Clone)]
pub struct NavService {
    store: Arc<dyn NavStore>,
    upstream: Arc<dyn UpstreamSource>,
    pipeline: BackfillPipeline,
}

impl NavService {
    pub fn new(
        store: Arc<dyn NavStore>,
        upstream: Arc<dyn UpstreamSource>,
        config: BackfillConfig,
    ) -> Self {
        let pipeline = BackfillPipeline::new(Arc::clone(&store), config);
        Self {
            store,
            upstream,
            pipeline,
        }
    }

    pub fn store(&self) -> Arc<dyn NavStore> {
        Arc::clone(&self.store)
    }

    /// Validates the raw query values and runs the lookup
    pub async fn lookup(
        &self,
        raw_code: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<NavLookup, FundError> {
        let request = validate_request(raw_code, start, end)?;
        self.lookup_validated(request).await
    }

    /// Runs the lookup for an already validated request
    #[instrument(skip(self), fields(scheme_code = %request.scheme_code))]
    pub async fn lookup_validated(&self, request: ValidatedRequest) -> Result<NavLookup, FundError> {
        let scheme_code = request.scheme_code;

        match self.store.probe(scheme_code).await {
            CacheProbe::Hit => {
                info!(%scheme_code, "Cache hit");
                self.serve_from_store(request).await
            }
            CacheProbe::Miss => {
                info!(%scheme_code, "Cache miss");
                self.serve_from_upstream(request, LookupSource::Upstream).await
            }
            CacheProbe::Unavailable(reason) => {
                warn!(%scheme_code, degraded = true, reason = %reason, "Store unavailable, serving from upstream");
                self.serve_from_upstream(request, LookupSource::UpstreamDegraded).await
            }
        }
    }

    async fn serve_from_store(&self, request: ValidatedRequest) -> Result<NavLookup, FundError> {
        let stored = self
            .store
            .read_series(request.scheme_code, request.window)
            .await
            .map_err(|e| FundError::StoreRead(e.to_string()))?;

        let data = stored.to_points();
        Ok(NavLookup {
            response: assemble(stored.fund.meta, data, request.window.as_ref()),
            source: LookupSource::Store,
            backfill: None,
        })
    }

    async fn serve_from_upstream(
        &self,
        request: ValidatedRequest,
        source: LookupSource,
    ) -> Result<NavLookup, FundError> {
        let scheme_code = request.scheme_code;
        let history = self
            .upstream
            .fetch_full_history(scheme_code)
            .await
            .map_err(|e| upstream_error(scheme_code, e))?;

        if history.meta.is_empty() {
            return Err(FundError::InvalidIdentifier(scheme_code));
        }
        info!(%scheme_code, records = history.data.len(), "Fetched history from upstream");

        let data = filter_series(&history.data, request.window.as_ref());
        let response = assemble(history.meta.clone(), data, request.window.as_ref());
        let backfill = self.pipeline.spawn(history.meta, history.data);

        Ok(NavLookup {
            response,
            source,
            backfill: Some(backfill),
        })
    }
}

fn upstream_error(scheme_code: SchemeCode, error: PortError) -> FundError {
    if error.is_not_found() {
        FundError::InvalidIdentifier(scheme_code)
    } else {
        FundError::Upstream(error.to_string())
    }
}
