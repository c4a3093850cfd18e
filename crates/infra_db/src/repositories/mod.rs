//! Repository implementations
//!
//! Repositories encapsulate SQL and map rows to plain structs. They know
//! nothing of the domain types; the adapters translate.
//!
//! # Architecture
//!
//! - Runtime-checked queries (`query_as` with `FromRow`)
//! - Batch writes through `QueryBuilder::push_values`
//! - Transaction support for multi-row writes

pub mod fund;

pub use fund::{FundRepository, FundRow, NavRow, NewFund, NewNavRecord};
