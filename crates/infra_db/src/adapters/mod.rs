//! Domain Adapters
//!
//! This module provides adapter implementations for domain ports,
//! connecting domain interfaces to the PostgreSQL database layer.
//!
//! # Architecture
//!
//! Each adapter:
//! - Implements the domain's port trait
//! - Translates between domain models and database row types
//! - Uses the repository layer for database operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresNavStore;
//! use domain_fund::NavStore;
//!
//! let store = PostgresNavStore::new(pool, Duration::from_secs(2));
//! let series = store.read_series(scheme_code, None).await?;
//! ```

pub mod fund;

pub use fund::PostgresNavStore;
