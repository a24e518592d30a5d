//! Dependency initialization and wiring for the tenant search CLI.

use std::env;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::CliError;
use tenant_search_repository::{OpenSearchClient, TenantSearchConfig, TenantSearchService};

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

/// Connection mode for OpenSearch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    FailFast,
    /// Retry connection until successful.
    Retry,
}

impl ConnectionMode {
    /// Parse a connection mode.
    ///
    /// Valid values: "fail-fast" or "retry" (case-insensitive).
    /// Defaults to "retry" if not set or invalid.
    pub fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("retry").to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Self::FailFast,
            "retry" => Self::Retry,
            _ => {
                warn!("Invalid OPENSEARCH_CONNECTION_MODE, defaulting to 'retry'");
                Self::Retry
            }
        }
    }

    fn from_env() -> Self {
        Self::parse(env::var("OPENSEARCH_CONNECTION_MODE").ok().as_deref())
    }
}

/// Service configuration read from the environment.
///
/// # Environment Variables
///
/// - `TENANT_SEARCH_DEFAULT_HITS_PER_PAGE`: Page size when a query sets none (default: 10)
/// - `TENANT_SEARCH_FACET_SIZE`: Maximum buckets per facet (default: 100)
fn service_config_from_env() -> Result<TenantSearchConfig, CliError> {
    let mut config = TenantSearchConfig::default();

    if let Ok(value) = env::var("TENANT_SEARCH_DEFAULT_HITS_PER_PAGE") {
        let hits_per_page = value
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                CliError::config(format!(
                    "TENANT_SEARCH_DEFAULT_HITS_PER_PAGE must be a positive integer, got '{}'",
                    value
                ))
            })?;
        config = config.with_default_hits_per_page(hits_per_page);
    }

    if let Ok(value) = env::var("TENANT_SEARCH_FACET_SIZE") {
        let facet_size = value.parse::<usize>().map_err(|e| {
            CliError::config(format!("TENANT_SEARCH_FACET_SIZE is invalid: {}", e))
        })?;
        config = config.with_facet_size(facet_size);
    }

    Ok(config)
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The service every command runs against.
    pub service: TenantSearchService,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_CONNECTION_MODE`: Connection mode - "fail-fast" or "retry" (default: retry)
    /// - `OPENSEARCH_RETRY_INTERVAL_SECS`: Retry interval in seconds (default: 15)
    /// - `TENANT_SEARCH_DEFAULT_HITS_PER_PAGE`, `TENANT_SEARCH_FACET_SIZE`: query defaults
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(CliError)` - If initialization fails (only in fail-fast mode for connection errors)
    pub async fn new() -> Result<Self, CliError> {
        let opensearch_url =
            env::var("OPENSEARCH_URL").unwrap_or_else(|_| DEFAULT_OPENSEARCH_URL.to_string());
        let connection_mode = ConnectionMode::from_env();
        let retry_interval = env::var("OPENSEARCH_RETRY_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_INTERVAL_SECS);
        let config = service_config_from_env()?;

        info!(
            opensearch_url = %opensearch_url,
            connection_mode = ?connection_mode,
            retry_interval_secs = retry_interval,
            default_hits_per_page = config.default_hits_per_page,
            "Initializing dependencies"
        );

        let client = Self::connect_to_opensearch(
            &opensearch_url,
            connection_mode,
            Duration::from_secs(retry_interval),
        )
        .await?;

        info!("OpenSearch connection established");

        let service = TenantSearchService::with_config(Arc::new(client), config);
        Ok(Self { service })
    }

    /// Connect to OpenSearch with retry logic based on connection mode.
    async fn connect_to_opensearch(
        url: &str,
        mode: ConnectionMode,
        retry_interval: Duration,
    ) -> Result<OpenSearchClient, CliError> {
        loop {
            match Self::try_connect_opensearch(url).await {
                Ok(client) => return Ok(client),
                Err(e) => match mode {
                    ConnectionMode::FailFast => {
                        return Err(CliError::config(format!(
                            "Failed to connect to OpenSearch: {}",
                            e
                        )));
                    }
                    ConnectionMode::Retry => {
                        warn!(
                            opensearch_url = %url,
                            error = %e,
                            retry_interval_secs = retry_interval.as_secs(),
                            "Failed to connect to OpenSearch, retrying..."
                        );
                        sleep(retry_interval).await;
                    }
                },
            }
        }
    }

    /// Attempt to connect to OpenSearch.
    async fn try_connect_opensearch(url: &str) -> Result<OpenSearchClient, CliError> {
        let client = OpenSearchClient::new(url).await.map_err(|e| {
            CliError::config(format!("Failed to create OpenSearch client: {}", e))
        })?;
        client.ping().await?;
        Ok(client)
    }
}
