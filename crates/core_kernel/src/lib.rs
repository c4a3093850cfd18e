//! Core Kernel - Foundational types shared by the NAV cache crates
//!
//! - Typed identifiers (scheme codes and store-assigned keys)
//! - `dd-mm-yyyy` date handling and request windows
//! - Port error and health-check types for the adapter seams

pub mod temporal;
pub mod identifiers;
pub mod ports;

pub use temporal::{DateWindow, TemporalError, DATE_FORMAT, parse_date, format_date};
pub use identifiers::{FundKey, NavRecordKey, SchemeCode, SchemeCodeError};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
