//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the NAV cache, using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: `FundRepository` owns the SQL,
//! and `PostgresNavStore` adapts it to the fund domain's `NavStore` port.
//!
//! # Tables
//!
//! - `funds`: one row per scheme, unique on `scheme_code`
//! - `nav_records`: one row per (fund, date), newest-first index
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_lazy_pool, ensure_schema, DatabaseConfig, PostgresNavStore};
//!
//! let config = DatabaseConfig::new("postgres://localhost/nav_cache");
//! let pool = create_lazy_pool(&config)?;
//! ensure_schema(&pool).await?;
//! let store = PostgresNavStore::new(pool, config.probe_timeout);
//! ```

pub mod pool;
pub mod error;
pub mod schema;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, create_pool, create_lazy_pool, DatabaseConfig};
pub use error::DatabaseError;
pub use schema::{ensure_schema, SCHEMA_SQL};
pub use repositories::FundRepository;
pub use adapters::PostgresNavStore;
