//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! NAV cache test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built fund metadata, histories and windows
//! - `builders`: Builder patterns for series and metadata
//! - `database`: Database test helpers and container management
//! - `assertions`: Order, window and precision checks for series
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
