use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use reqwest::header::HeaderMap;
use reqwest::header::CACHE_CONTROL;
use tokio::sync::RwLock;

use super::config::ProviderConfig;
use super::errors::FederatedError;
use super::jwks::JwkSet;

/// Process-wide cache of the provider's signing keys.
///
/// Keys are kept for the lifetime the provider states in
/// `Cache-Control: max-age` and refetched once stale.
pub struct JwksCache {
    client: reqwest::Client,
    jwks_uri: String,
    fallback_ttl: Duration,
    cached: RwLock<Option<CachedKeySet>>,
}

#[derive(Debug, Clone)]
struct CachedKeySet {
    keys: Arc<JwkSet>,
    fetched_at: Instant,
    ttl: Duration,
}

impl CachedKeySet {
    fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < self.ttl
    }
}

impl JwksCache {
    /// # Errors
    /// * `Configuration` - The HTTP client cannot be built
    pub fn new(config: &ProviderConfig) -> Result<Self, FederatedError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| FederatedError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            jwks_uri: config.jwks_uri.clone(),
            fallback_ttl: config.fallback_cache_ttl,
            cached: RwLock::new(None),
        })
    }

    /// Current key set, fetched from the provider when missing or stale.
    ///
    /// # Errors
    /// * `KeyDiscovery` - Fetch failed, timed out, or returned an unusable body
    pub async fn keys(&self) -> Result<Arc<JwkSet>, FederatedError> {
        if let Some(cached) = self.cached.read().await.as_ref() {
            if cached.is_fresh() {
                return Ok(Arc::clone(&cached.keys));
            }
        }

        let mut cached = self.cached.write().await;
        // Another request may have refreshed while this one waited for the lock
        if let Some(current) = cached.as_ref() {
            if current.is_fresh() {
                return Ok(Arc::clone(&current.keys));
            }
        }

        let fetched = self.fetch().await?;
        let keys = Arc::clone(&fetched.keys);
        *cached = Some(fetched);

        Ok(keys)
    }

    async fn fetch(&self) -> Result<CachedKeySet, FederatedError> {
        let response = self
            .client
            .get(&self.jwks_uri)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| FederatedError::KeyDiscovery(e.to_string()))?;

        let ttl = max_age(response.headers()).unwrap_or(self.fallback_ttl);

        let keys: JwkSet = response
            .json()
            .await
            .map_err(|e| FederatedError::KeyDiscovery(e.to_string()))?;

        tracing::debug!(
            jwks_uri = %self.jwks_uri,
            keys = keys.keys.len(),
            ttl_secs = ttl.as_secs(),
            "Provider signing keys fetched"
        );

        Ok(CachedKeySet {
            keys: Arc::new(keys),
            fetched_at: Instant::now(),
            ttl,
        })
    }
}

fn max_age(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(CACHE_CONTROL)?
        .to_str()
        .ok()?
        .split(',')
        .find_map(|directive| directive.trim().strip_prefix("max-age="))
        .and_then(|seconds| seconds.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
