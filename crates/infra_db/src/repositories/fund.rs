//! Fund repository implementation
//!
//! This module provides database access for cached mutual fund metadata and
//! NAV observations.

use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument};

use crate::error::DatabaseError;

/// Repository for cached fund data
///
/// The FundRepository handles all database operations for the `funds` and
/// `nav_records` tables.
#[derive(Debug, Clone)]
pub struct FundRepository {
    pool: PgPool,
}

impl FundRepository {
    /// Creates a new FundRepository with the given connection pool
    ///
    /// # Arguments
    ///
    /// * `pool` - The PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Checks whether a fund with this scheme code is fully backfilled
    ///
    /// A fund row whose history is still being written, or whose backfill
    /// lost a batch, does not count.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Timeout` if the query does not finish within
    /// `timeout`
    #[instrument(skip(self))]
    pub async fn exists(&self, scheme_code: i64, timeout: Duration) -> Result<bool, DatabaseError> {
        let query = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM funds WHERE scheme_code = $1 AND backfilled_at IS NOT NULL)",
        )
        .bind(scheme_code)
        .fetch_one(&self.pool);

        match tokio::time::timeout(timeout, query).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(DatabaseError::Timeout(timeout.as_millis() as u64)),
        }
    }

    /// Retrieves a fund by its scheme code
    #[instrument(skip(self))]
    pub async fn get_fund_by_code(&self, scheme_code: i64) -> Result<FundRow, DatabaseError> {
        sqlx::query_as::<_, FundRow>(
            r#"
            SELECT id, fund_house, scheme_type, scheme_category, scheme_code, scheme_name
            FROM funds
            WHERE scheme_code = $1
            "#,
        )
        .bind(scheme_code)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Fund", scheme_code))
    }

    /// Retrieves NAV records for a fund, newest first
    ///
    /// # Arguments
    ///
    /// * `fund_id` - The fund key
    /// * `range` - Optional inclusive `(from, to)` date range
    #[instrument(skip(self))]
    pub async fn get_nav_records(
        &self,
        fund_id: i64,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<NavRow>, DatabaseError> {
        let rows = match range {
            Some((from, to)) => {
                sqlx::query_as::<_, NavRow>(
                    r#"
                    SELECT id, fund_id, nav_date, nav
                    FROM nav_records
                    WHERE fund_id = $1 AND nav_date BETWEEN $2 AND $3
                    ORDER BY nav_date DESC
                    "#,
                )
                .bind(fund_id)
                .bind(from)
                .bind(to)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, NavRow>(
                    r#"
                    SELECT id, fund_id, nav_date, nav
                    FROM nav_records
                    WHERE fund_id = $1
                    ORDER BY nav_date DESC
                    "#,
                )
                .bind(fund_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        debug!(count = rows.len(), "Loaded NAV records");
        Ok(rows)
    }

    /// Inserts a fund, or returns the key of the existing row
    ///
    /// The no-op `DO UPDATE` makes `RETURNING` yield the existing id on
    /// conflict; descriptive columns keep their first-written values.
    #[instrument(skip(self, fund), fields(scheme_code = fund.scheme_code))]
    pub async fn insert_fund(&self, fund: &NewFund) -> Result<i64, DatabaseError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO funds (fund_house, scheme_type, scheme_category, scheme_code, scheme_name)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (scheme_code) DO UPDATE SET scheme_code = EXCLUDED.scheme_code
            RETURNING id
            "#,
        )
        .bind(&fund.fund_house)
        .bind(&fund.scheme_type)
        .bind(&fund.scheme_category)
        .bind(fund.scheme_code)
        .bind(&fund.scheme_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Marks a fund's history as completely written
    ///
    /// Returns `DatabaseError::NotFound` when no fund has this key.
    #[instrument(skip(self))]
    pub async fn mark_backfilled(&self, fund_id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE funds SET backfilled_at = NOW() WHERE id = $1")
            .bind(fund_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Fund", fund_id));
        }
        Ok(())
    }

    /// Inserts NAV records on a caller-supplied connection or transaction
    ///
    /// Uses a single multi-row statement. Rows whose `(fund_id, nav_date)`
    /// already exists are skipped. Returns the number of rows written.
    pub async fn insert_nav_batch_in(
        conn: &mut PgConnection,
        fund_id: i64,
        records: &[NewNavRecord],
    ) -> Result<u64, DatabaseError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO nav_records (fund_id, nav_date, nav) ");
        builder.push_values(records, |mut row, record| {
            row.push_bind(fund_id)
                .push_bind(record.nav_date)
                .push_bind(record.nav);
        });
        builder.push(" ON CONFLICT (fund_id, nav_date) DO NOTHING");

        let result = builder.build().execute(&mut *conn).await?;
        Ok(result.rows_affected())
    }

    /// Inserts NAV records in their own transaction
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn insert_nav_batch(
        &self,
        fund_id: i64,
        records: &[NewNavRecord],
    ) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let written = Self::insert_nav_batch_in(&mut *tx, fund_id, records).await?;
        tx.commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;
        Ok(written)
    }

    /// Round-trips a trivial query
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

/// Database row for fund
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FundRow {
    pub id: i64,
    pub fund_house: String,
    pub scheme_type: String,
    pub scheme_category: String,
    pub scheme_code: i64,
    pub scheme_name: String,
}

/// Database row for NAV record
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NavRow {
    pub id: i64,
    pub fund_id: i64,
    pub nav_date: NaiveDate,
    pub nav: Decimal,
}

/// Fund values to insert
#[derive(Debug, Clone)]
pub struct NewFund {
    pub fund_house: String,
    pub scheme_type: String,
    pub scheme_category: String,
    pub scheme_code: i64,
    pub scheme_name: String,
}

/// NAV values to insert
#[derive(Debug, Clone, Copy)]
pub struct NewNavRecord {
    pub nav_date: NaiveDate,
    pub nav: Decimal,
}
