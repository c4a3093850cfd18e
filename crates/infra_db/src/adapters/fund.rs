//! PostgreSQL NAV Store Adapter
//!
//! Implements the fund domain's `NavStore` port on top of `FundRepository`.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresNavStore;
//! use domain_fund::NavStore;
//! use std::sync::Arc;
//!
//! let store: Arc<dyn NavStore> = Arc::new(PostgresNavStore::new(pool, Duration::from_secs(2)));
//! let probe = store.probe(SchemeCode::new(120503)).await;
//! ```

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, DateWindow, DomainPort, FundKey, HealthCheckResult, HealthCheckable,
    NavRecordKey, PortError, SchemeCode,
};
use domain_fund::{CacheProbe, FundMeta, FundMetadata, NavEntry, NavRecord, NavStore, StoredSeries};

use crate::error::DatabaseError;
use crate::repositories::fund::{FundRepository, FundRow, NavRow, NewFund, NewNavRecord};

/// PostgreSQL-backed implementation of the NavStore port
///
/// # Error Handling
///
/// Database errors are translated to `PortError` variants:
/// - `DatabaseError::NotFound` -> `PortError::NotFound`
/// - connection failures and timeouts -> `PortError::Connection` / `PortError::Timeout`
/// - Other errors -> `PortError::Internal`
#[derive(Debug, Clone)]
pub struct PostgresNavStore {
    repository: FundRepository,
    probe_timeout: Duration,
}

impl PostgresNavStore {
    /// Creates a new store adapter
    ///
    /// # Arguments
    ///
    /// * `pool` - The PostgreSQL connection pool
    /// * `probe_timeout` - Upper bound for the existence check
    pub fn new(pool: PgPool, probe_timeout: Duration) -> Self {
        Self {
            repository: FundRepository::new(pool),
            probe_timeout,
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &FundRepository {
        &self.repository
    }
}

impl DomainPort for PostgresNavStore {}

#[async_trait]
impl HealthCheckable for PostgresNavStore {
    /// Checks database connectivity with a `SELECT 1` round-trip
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let result = self.repository.ping().await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => HealthCheckResult {
                adapter_id: "postgres-nav-store".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id: "postgres-nav-store".to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database error: {}", e)),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl NavStore for PostgresNavStore {
    #[instrument(skip(self), fields(scheme_code = %scheme_code))]
    async fn probe(&self, scheme_code: SchemeCode) -> CacheProbe {
        match self.repository.exists(scheme_code.get(), self.probe_timeout).await {
            Ok(true) => CacheProbe::Hit,
            Ok(false) => CacheProbe::Miss,
            Err(e) => CacheProbe::Unavailable(e.classify().to_string()),
        }
    }

    #[instrument(skip(self), fields(scheme_code = %scheme_code))]
    async fn read_series(
        &self,
        scheme_code: SchemeCode,
        window: Option<DateWindow>,
    ) -> Result<StoredSeries, PortError> {
        let fund = self
            .repository
            .get_fund_by_code(scheme_code.get())
            .await
            .map_err(db_to_port_error)?;

        let records = self
            .repository
            .get_nav_records(fund.id, window.map(|w| (w.start(), w.end())))
            .await
            .map_err(db_to_port_error)?;

        debug!(records = records.len(), "Read series from store");
        Ok(StoredSeries {
            fund: row_to_fund(fund),
            records: records.into_iter().map(row_to_record).collect(),
        })
    }

    #[instrument(skip(self, meta), fields(scheme_code = %meta.scheme_code))]
    async fn insert_fund(&self, meta: &FundMeta) -> Result<FundKey, PortError> {
        let new_fund = NewFund {
            fund_house: meta.fund_house.clone(),
            scheme_type: meta.scheme_type.clone(),
            scheme_category: meta.scheme_category.clone(),
            scheme_code: meta.scheme_code.get(),
            scheme_name: meta.scheme_name.clone(),
        };

        self.repository
            .insert_fund(&new_fund)
            .await
            .map(FundKey::new)
            .map_err(db_to_port_error)
    }

    #[instrument(skip(self, entries), fields(fund_id = %fund_id, count = entries.len()))]
    async fn insert_nav_batch(&self, fund_id: FundKey, entries: &[NavEntry]) -> Result<u64, PortError> {
        let records: Vec<NewNavRecord> = entries
            .iter()
            .map(|e| NewNavRecord {
                nav_date: e.nav_date,
                nav: e.nav,
            })
            .collect();

        self.repository
            .insert_nav_batch(fund_id.get(), &records)
            .await
            .map_err(db_to_port_error)
    }

    #[instrument(skip(self), fields(fund_id = %fund_id))]
    async fn mark_complete(&self, fund_id: FundKey) -> Result<(), PortError> {
        self.repository
            .mark_backfilled(fund_id.get())
            .await
            .map_err(db_to_port_error)
    }
}

/// Converts database errors to port errors
fn db_to_port_error(e: DatabaseError) -> PortError {
    match e.classify() {
        DatabaseError::NotFound(msg) => PortError::NotFound {
            entity_type: "Fund".to_string(),
            id: msg,
        },
        DatabaseError::DuplicateEntry(message) => PortError::Conflict { message },
        DatabaseError::Timeout(duration_ms) => PortError::Timeout {
            operation: "database query".to_string(),
            duration_ms,
        },
        e if e.is_connection_error() => PortError::Connection {
            message: e.to_string(),
            source: Some(Box::new(e)),
        },
        e => PortError::Internal {
            message: e.to_string(),
            source: Some(Box::new(e)),
        },
    }
}

fn row_to_fund(row: FundRow) -> FundMetadata {
    FundMetadata {
        id: FundKey::new(row.id),
        meta: FundMeta {
            fund_house: row.fund_house,
            scheme_type: row.scheme_type,
            scheme_category: row.scheme_category,
            scheme_code: SchemeCode::new(row.scheme_code),
            scheme_name: row.scheme_name,
        },
    }
}

fn row_to_record(row: NavRow) -> NavRecord {
    NavRecord {
        id: NavRecordKey::new(row.id),
        fund_id: FundKey::new(row.fund_id),
        nav_date: row.nav_date,
        nav: row.nav,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_translation() {
        assert!(db_to_port_error(DatabaseError::not_found("Fund", 1)).is_not_found());
        assert!(db_to_port_error(DatabaseError::Timeout(2000)).is_transient());
        assert!(db_to_port_error(DatabaseError::SqlError(sqlx::Error::PoolTimedOut)).is_transient());
        assert!(!db_to_port_error(DatabaseError::QueryFailed("bad".into())).is_transient());
    }

    #[test]
    fn test_row_mapping() {
        let fund = row_to_fund(FundRow {
            id: 7,
            fund_house: "Axis Mutual Fund".into(),
            scheme_type: "Open Ended Schemes".into(),
            scheme_category: "Equity Scheme - ELSS".into(),
            scheme_code: 120503,
            scheme_name: "Axis ELSS".into(),
        });
        assert_eq!(fund.id, FundKey::new(7));
        assert_eq!(fund.meta.scheme_code, SchemeCode::new(120503));
    }

    #[tokio::test]
    async fn test_probe_degrades_when_database_unreachable() {
        let config = crate::DatabaseConfig::new("postgres://nobody@127.0.0.1:1/none")
            .connect_timeout(Duration::from_millis(200))
            .min_connections(0);
        let pool = crate::create_lazy_pool(&config).unwrap();
        let store = PostgresNavStore::new(pool, Duration::from_secs(1));

        let probe = store.probe(SchemeCode::new(120503)).await;

        assert!(matches!(probe, CacheProbe::Unavailable(_)));
        assert!(!store.health_check().await.is_available());
    }
}
