//! Fund NAV Domain
//!
//! Read-through cache for mutual fund NAV histories. A lookup is served from
//! the durable store when the fund has been seen before; otherwise the full
//! history is fetched from the upstream source, filtered for the reply, and
//! written back to the store in concurrent batches.
//!
//! # Key Concepts
//!
//! - **Scheme code**: the external identifier callers use
//! - **NAV point**: one `{date, nav}` observation in wire form
//! - **Window**: optional inclusive date range narrowing the reply
//! - **Backfill**: batch persistence of a fetched history after a miss
//!
//! # NAV Precision
//!
//! Values are stored as decimals and rendered with 4 fractional digits
//! when read back from the store. Upstream values pass through unchanged.

pub mod fund;
pub mod nav;
pub mod validation;
pub mod filter;
pub mod response;
pub mod ports;
pub mod backfill;
pub mod service;
pub mod adapters;
pub mod error;

pub use fund::{FundMeta, FundMetadata};
pub use nav::{format_nav, NavEntry, NavParseError, NavPoint, NavRecord, NAV_DISPLAY_SCALE};
pub use validation::{validate_request, validate_request_at, ValidatedRequest};
pub use filter::filter_series;
pub use response::{assemble, NavResponse};
pub use ports::{CacheProbe, NavStore, StoredSeries, UpstreamHistory, UpstreamSource};
pub use backfill::{partition, BackfillConfig, BackfillHandle, BackfillPipeline, BackfillReport};
pub use service::{LookupSource, NavLookup, NavService};
pub use error::FundError;
