//! Schema bootstrap
//!
//! The schema is small and fixed, so it is applied as one idempotent script
//! rather than through a migration runner.

use sqlx::PgPool;
use tracing::info;

use crate::error::DatabaseError;

/// DDL for the `funds` and `nav_records` tables
pub const SCHEMA_SQL: &str = include_str!("../../../migrations/20240101_000001_nav_cache.sql");

/// Creates the tables and indexes if they do not exist yet
///
/// # Errors
///
/// Returns `DatabaseError::SchemaFailed` if the script cannot be executed
pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::raw_sql(SCHEMA_SQL)
        .execute(pool)
        .await
        .map_err(|e| DatabaseError::SchemaFailed(e.to_string()))?;

    info!("Database schema is in place");
    Ok(())
}
