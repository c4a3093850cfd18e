//! Upstream adapters for the fund domain
//!
//! - **MfApiClient**: fetches full NAV histories from the mfapi.in REST API
//! - **MockUpstream**: in-memory source for testing (see `ports::mock`)
//!
//! ```rust,ignore
//! use domain_fund::adapters::{MfApiClient, MfApiConfig};
//! use domain_fund::UpstreamSource;
//! use std::sync::Arc;
//!
//! let client = MfApiClient::new(MfApiConfig::default())?;
//! let upstream: Arc<dyn UpstreamSource> = Arc::new(client);
//! ```

pub mod mfapi;

pub use mfapi::{MfApiClient, MfApiConfig, DEFAULT_BASE_URL};
