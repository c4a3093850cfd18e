//! API configuration

use std::time::Duration;

use serde::Deserialize;

use domain_fund::adapters::MfApiConfig;
use domain_fund::BackfillConfig;
use infra_db::DatabaseConfig;

/// API configuration
///
/// Every field can be overridden with a `NAV_`-prefixed environment
/// variable, e.g. `NAV_PORT=9000` or `NAV_CONCURRENCY_LIMIT=4`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_max_lifetime_secs: u64,
    /// Upper bound for the cache existence check
    pub probe_timeout_ms: u64,
    /// Upstream base URL, the scheme code is appended
    pub upstream_base_url: String,
    pub upstream_timeout_secs: u64,
    /// Records per backfill batch, capped at `backfill::MAX_BATCH_SIZE`
    pub batch_size: usize,
    /// Concurrent batch writes per backfill
    pub concurrency_limit: usize,
    /// Log level
    pub log_level: String,
    /// Emit JSON log lines
    pub log_json: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/nav_cache".to_string(),
            db_max_connections: 100,
            db_min_connections: 20,
            db_max_lifetime_secs: 60,
            probe_timeout_ms: 2000,
            upstream_base_url: domain_fund::adapters::mfapi::DEFAULT_BASE_URL.to_string(),
            upstream_timeout_secs: 30,
            batch_size: domain_fund::backfill::DEFAULT_BATCH_SIZE,
            concurrency_limit: domain_fund::backfill::DEFAULT_CONCURRENCY_LIMIT,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::load(config::Environment::with_prefix("NAV"))
    }

    /// Loads configuration from an environment source layered over defaults
    pub fn load(environment: config::Environment) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();

        config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("database_url", defaults.database_url)?
            .set_default("db_max_connections", i64::from(defaults.db_max_connections))?
            .set_default("db_min_connections", i64::from(defaults.db_min_connections))?
            .set_default("db_max_lifetime_secs", defaults.db_max_lifetime_secs as i64)?
            .set_default("probe_timeout_ms", defaults.probe_timeout_ms as i64)?
            .set_default("upstream_base_url", defaults.upstream_base_url)?
            .set_default("upstream_timeout_secs", defaults.upstream_timeout_secs as i64)?
            .set_default("batch_size", defaults.batch_size as i64)?
            .set_default("concurrency_limit", defaults.concurrency_limit as i64)?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_json", defaults.log_json)?
            .add_source(environment.try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Pool settings for the NAV store
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database_url.clone())
            .max_connections(self.db_max_connections)
            .min_connections(self.db_min_connections)
            .max_lifetime(Duration::from_secs(self.db_max_lifetime_secs))
            .probe_timeout(self.probe_timeout())
    }

    pub fn backfill_config(&self) -> BackfillConfig {
        BackfillConfig::default()
            .batch_size(self.batch_size)
            .concurrency_limit(self.concurrency_limit)
    }

    pub fn upstream_config(&self) -> MfApiConfig {
        MfApiConfig::default()
            .base_url(self.upstream_base_url.clone())
            .timeout(Duration::from_secs(self.upstream_timeout_secs))
    }
}
