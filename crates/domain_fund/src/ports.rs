//! Fund Domain Ports
//!
//! The NAV cache depends on two outside systems, each behind a port:
//!
//! - **`NavStore`**: the durable cache (PostgreSQL in `infra_db`)
//! - **`UpstreamSource`**: the authoritative NAV API (`adapters::mfapi`)
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_fund::{NavService, BackfillConfig};
//! use std::sync::Arc;
//!
//! let store: Arc<dyn NavStore> = Arc::new(PostgresNavStore::new(pool, probe_timeout));
//! let upstream: Arc<dyn UpstreamSource> = Arc::new(MfApiClient::new(config)?);
//! let service = NavService::new(store, upstream, BackfillConfig::default());
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{DateWindow, DomainPort, FundKey, HealthCheckable, PortError, SchemeCode};

use crate::fund::{FundMeta, FundMetadata};
use crate::nav::{NavEntry, NavPoint, NavRecord};

/// Outcome of the existence check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheProbe {
    /// The fund and its complete history are in the store
    Hit,
    /// The store answered and the fund is absent or only partly written
    Miss,
    /// The store could not answer (connection failure or timeout)
    Unavailable(String),
}

/// A fund and its observations as read back from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSeries {
    pub fund: FundMetadata,
    /// Newest first
    pub records: Vec<NavRecord>,
}

impl StoredSeries {
    /// Renders the records in wire form, keeping their order
    pub fn to_points(&self) -> Vec<NavPoint> {
        self.records.iter().map(NavRecord::to_point).collect()
    }
}

/// Port for the durable NAV cache
///
/// Implementations own their connection handling. `probe` never fails: a
/// store that cannot be reached reports [`CacheProbe::Unavailable`].
#[async_trait]
pub trait NavStore: DomainPort + HealthCheckable {
    /// Checks whether the fund has been cached
    ///
    /// Only a fund marked with [`mark_complete`](Self::mark_complete) is a
    /// hit. A fund row whose backfill is running or lost a batch is a miss.
    async fn probe(&self, scheme_code: SchemeCode) -> CacheProbe;

    /// Reads the fund and its records, newest first
    ///
    /// When a window is given only records inside it are returned.
    /// Returns `PortError::NotFound` when the fund is absent.
    async fn read_series(
        &self,
        scheme_code: SchemeCode,
        window: Option<DateWindow>,
    ) -> Result<StoredSeries, PortError>;

    /// Inserts the fund row and returns its key
    ///
    /// Idempotent on `scheme_code`: an existing fund's key is returned.
    async fn insert_fund(&self, meta: &FundMeta) -> Result<FundKey, PortError>;

    /// Inserts one batch of observations in its own transaction
    ///
    /// Returns the number of rows actually written. Observations that are
    /// already stored for the same date are skipped.
    async fn insert_nav_batch(&self, fund_id: FundKey, entries: &[NavEntry]) -> Result<u64, PortError>;

    /// Records that every observation of the fund has been written
    async fn mark_complete(&self, fund_id: FundKey) -> Result<(), PortError>;
}

/// Payload returned by the upstream source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamHistory {
    #[serde(default)]
    pub meta: FundMeta,
    /// Full history in source order
    #[serde(default)]
    pub data: Vec<NavPoint>,
}

/// Port for the authoritative NAV source
#[async_trait]
pub trait UpstreamSource: DomainPort {
    /// Fetches the complete history of one scheme in a single call
    ///
    /// An unrecognized scheme code is reported as `PortError::NotFound`.
    async fn fetch_full_history(&self, scheme_code: SchemeCode) -> Result<UpstreamHistory, PortError>;
}

/// In-memory port implementations for testing
///
/// Both mocks count their calls. `MockNavStore` also tracks how many batch
/// writes are in flight at once and can be told to fail in specific ways.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::{BTreeMap, HashMap, HashSet};
    use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::{NaiveDate, Utc};
    use tokio::sync::RwLock;

    use core_kernel::{AdapterHealth, HealthCheckResult, NavRecordKey};

    #[derive(Debug, Default)]
    struct StoreState {
        funds: HashMap<SchemeCode, FundMetadata>,
        records: HashMap<FundKey, BTreeMap<NaiveDate, NavRecord>>,
        complete: HashSet<FundKey>,
    }

    /// In-memory NavStore with failure injection and call counters
    #[derive(Debug)]
    pub struct MockNavStore {
        state: RwLock<StoreState>,
        next_fund_id: AtomicI64,
        next_record_id: AtomicI64,
        available: AtomicBool,
        fail_fund_insert: AtomicBool,
        fail_reads: AtomicBool,
        fail_batch_containing: Mutex<Option<NaiveDate>>,
        write_delay: Mutex<Duration>,
        probe_calls: AtomicUsize,
        read_calls: AtomicUsize,
        fund_inserts: AtomicUsize,
        batch_calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl Default for MockNavStore {
        fn default() -> Self {
            Self {
                state: RwLock::new(StoreState::default()),
                next_fund_id: AtomicI64::new(1),
                next_record_id: AtomicI64::new(1),
                available: AtomicBool::new(true),
                fail_fund_insert: AtomicBool::new(false),
                fail_reads: AtomicBool::new(false),
                fail_batch_containing: Mutex::new(None),
                write_delay: Mutex::new(Duration::ZERO),
                probe_calls: AtomicUsize::new(0),
                read_calls: AtomicUsize::new(0),
                fund_inserts: AtomicUsize::new(0),
                batch_calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    impl MockNavStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates the store with one fully backfilled fund
        pub async fn with_fund(self, meta: FundMeta, series: &[NavPoint]) -> Self {
            let fund_id = self.store_fund(&meta).await;
            let entries: Vec<NavEntry> = series
                .iter()
                .filter_map(|p| NavEntry::try_from(p).ok())
                .collect();
            self.store_entries(fund_id, &entries).await;
            self.state.write().await.complete.insert(fund_id);
            self
        }

        /// Sleeps inside every batch write, to widen the overlap window
        pub fn with_write_delay(self, delay: Duration) -> Self {
            if let Ok(mut guard) = self.write_delay.lock() {
                *guard = delay;
            }
            self
        }

        /// Makes the store unreachable (or reachable again)
        pub fn set_available(&self, available: bool) {
            self.available.store(available, Ordering::SeqCst);
        }

        pub fn fail_fund_insert(&self, fail: bool) {
            self.fail_fund_insert.store(fail, Ordering::SeqCst);
        }

        /// Makes `read_series` fail with a connection error while `probe`
        /// keeps answering
        pub fn fail_reads(&self, fail: bool) {
            self.fail_reads.store(fail, Ordering::SeqCst);
        }

        /// Fails any batch that contains `date`
        pub fn fail_batch_containing(&self, date: NaiveDate) {
            if let Ok(mut guard) = self.fail_batch_containing.lock() {
                *guard = Some(date);
            }
        }

        pub fn probe_calls(&self) -> usize {
            self.probe_calls.load(Ordering::SeqCst)
        }

        pub fn read_calls(&self) -> usize {
            self.read_calls.load(Ordering::SeqCst)
        }

        pub fn fund_inserts(&self) -> usize {
            self.fund_inserts.load(Ordering::SeqCst)
        }

        pub fn batch_calls(&self) -> usize {
            self.batch_calls.load(Ordering::SeqCst)
        }

        /// Highest number of batch writes observed running at once
        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }

        /// Stored observation count for a scheme
        pub async fn record_count(&self, scheme_code: SchemeCode) -> usize {
            let state = self.state.read().await;
            state
                .funds
                .get(&scheme_code)
                .and_then(|fund| state.records.get(&fund.id))
                .map(BTreeMap::len)
                .unwrap_or(0)
        }

        /// True once the scheme's backfill has been marked complete
        pub async fn is_complete(&self, scheme_code: SchemeCode) -> bool {
            let state = self.state.read().await;
            state
                .funds
                .get(&scheme_code)
                .is_some_and(|fund| state.complete.contains(&fund.id))
        }

        /// Stored dates for a scheme, oldest first
        pub async fn stored_dates(&self, scheme_code: SchemeCode) -> Vec<NaiveDate> {
            let state = self.state.read().await;
            state
                .funds
                .get(&scheme_code)
                .and_then(|fund| state.records.get(&fund.id))
                .map(|records| records.keys().copied().collect())
                .unwrap_or_default()
        }

        fn check_available(&self) -> Result<(), PortError> {
            if self.available.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(PortError::connection("mock store unavailable"))
            }
        }

        async fn store_fund(&self, meta: &FundMeta) -> FundKey {
            let mut state = self.state.write().await;
            if let Some(existing) = state.funds.get(&meta.scheme_code) {
                return existing.id;
            }
            let id = FundKey::new(self.next_fund_id.fetch_add(1, Ordering::SeqCst));
            state.funds.insert(
                meta.scheme_code,
                FundMetadata {
                    id,
                    meta: meta.clone(),
                },
            );
            id
        }

        async fn store_entries(&self, fund_id: FundKey, entries: &[NavEntry]) -> u64 {
            let mut state = self.state.write().await;
            let records = state.records.entry(fund_id).or_default();
            let mut written = 0;
            for entry in entries {
                if records.contains_key(&entry.nav_date) {
                    continue;
                }
                let id = NavRecordKey::new(self.next_record_id.fetch_add(1, Ordering::SeqCst));
                records.insert(
                    entry.nav_date,
                    NavRecord {
                        id,
                        fund_id,
                        nav_date: entry.nav_date,
                        nav: entry.nav,
                    },
                );
                written += 1;
            }
            written
        }
    }

    impl DomainPort for MockNavStore {}

    #[async_trait]
    impl HealthCheckable for MockNavStore {
        async fn health_check(&self) -> HealthCheckResult {
            let available = self.available.load(Ordering::SeqCst);
            HealthCheckResult {
                adapter_id: "mock-nav-store".to_string(),
                status: if available {
                    AdapterHealth::Healthy
                } else {
                    AdapterHealth::Unhealthy
                },
                latency_ms: 0,
                message: (!available).then(|| "mock store unavailable".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl NavStore for MockNavStore {
        async fn probe(&self, scheme_code: SchemeCode) -> CacheProbe {
            self.probe_calls.fetch_add(1, Ordering::SeqCst);
            if let Err(e) = self.check_available() {
                return CacheProbe::Unavailable(e.to_string());
            }
            let state = self.state.read().await;
            let complete = state
                .funds
                .get(&scheme_code)
                .is_some_and(|fund| state.complete.contains(&fund.id));
            if complete {
                CacheProbe::Hit
            } else {
                CacheProbe::Miss
            }
        }

        async fn read_series(
            &self,
            scheme_code: SchemeCode,
            window: Option<DateWindow>,
        ) -> Result<StoredSeries, PortError> {
            self.read_calls.fetch_add(1, Ordering::SeqCst);
            self.check_available()?;
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(PortError::connection("mock store read failed"));
            }

            let state = self.state.read().await;
            let fund = state
                .funds
                .get(&scheme_code)
                .cloned()
                .ok_or_else(|| PortError::not_found("Fund", scheme_code))?;

            let records = state
                .records
                .get(&fund.id)
                .map(|records| {
                    records
                        .values()
                        .rev()
                        .filter(|r| window.map_or(true, |w| w.contains(r.nav_date)))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();

            Ok(StoredSeries { fund, records })
        }

        async fn insert_fund(&self, meta: &FundMeta) -> Result<FundKey, PortError> {
            self.fund_inserts.fetch_add(1, Ordering::SeqCst);
            self.check_available()?;
            if self.fail_fund_insert.load(Ordering::SeqCst) {
                return Err(PortError::internal("fund insert rejected"));
            }
            Ok(self.store_fund(meta).await)
        }

        async fn insert_nav_batch(&self, fund_id: FundKey, entries: &[NavEntry]) -> Result<u64, PortError> {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let delay = self.write_delay.lock().map(|d| *d).unwrap_or_default();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let poisoned = self
                .fail_batch_containing
                .lock()
                .ok()
                .and_then(|d| *d)
                .is_some_and(|date| entries.iter().any(|e| e.nav_date == date));

            let result = match self.check_available() {
                Err(e) => Err(e),
                Ok(()) if poisoned => Err(PortError::internal("batch rejected")),
                Ok(()) => Ok(self.store_entries(fund_id, entries).await),
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }

        async fn mark_complete(&self, fund_id: FundKey) -> Result<(), PortError> {
            self.check_available()?;
            let mut state = self.state.write().await;
            if !state.funds.values().any(|fund| fund.id == fund_id) {
                return Err(PortError::not_found("Fund", fund_id));
            }
            state.complete.insert(fund_id);
            Ok(())
        }
    }

    /// In-memory UpstreamSource keyed by scheme code
    #[derive(Debug, Default)]
    pub struct MockUpstream {
        histories: RwLock<HashMap<SchemeCode, UpstreamHistory>>,
        failure: Mutex<Option<String>>,
        fetch_calls: AtomicUsize,
    }

    impl MockUpstream {
        pub fn new() -> Self {
            Self::default()
        }

        /// Registers a scheme's full history
        pub async fn with_history(self, meta: FundMeta, data: Vec<NavPoint>) -> Self {
            self.histories
                .write()
                .await
                .insert(meta.scheme_code, UpstreamHistory { meta, data });
            self
        }

        /// Registers a raw payload under `scheme_code`
        pub async fn with_payload(self, scheme_code: SchemeCode, history: UpstreamHistory) -> Self {
            self.histories.write().await.insert(scheme_code, history);
            self
        }

        /// Makes every fetch fail with a connection error
        pub fn fail_with(&self, message: impl Into<String>) {
            if let Ok(mut guard) = self.failure.lock() {
                *guard = Some(message.into());
            }
        }

        pub fn fetch_calls(&self) -> usize {
            self.fetch_calls.load(Ordering::SeqCst)
        }
    }

    impl DomainPort for MockUpstream {}

    #[async_trait]
    impl UpstreamSource for MockUpstream {
        async fn fetch_full_history(&self, scheme_code: SchemeCode) -> Result<UpstreamHistory, PortError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);

            if let Some(message) = self.failure.lock().ok().and_then(|f| f.clone()) {
                return Err(PortError::connection(message));
            }

            self.histories
                .read()
                .await
                .get(&scheme_code)
                .cloned()
                .ok_or_else(|| PortError::not_found("Scheme", scheme_code))
        }
    }
}
