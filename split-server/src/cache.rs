//! Caching layer for route pricing.
//!
//! A split scan queries many overlapping station pairs, and travelers
//! often re-run a scan for the same journey with different settings. We
//! cache each route answer keyed by the full query, so repeated lookups
//! within the TTL never reach the API.
//!
//! Only successful lookups are cached; failures are retried next time.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::domain::{PassengerContext, StationId, Timestamp};
use crate::split::{PricingError, RoutePricer, RouteQuote};

/// Cache key for route lookups: (origin, destination, departure as Unix
/// seconds, passenger).
type RouteKey = (StationId, StationId, i64, PassengerContext);

/// Configuration for the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl CacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            max_capacity: 10_000,
        }
    }
}

/// Pricer with caching.
///
/// Wraps any `RoutePricer` and caches its successful answers.
pub struct CachedPricer<P> {
    inner: P,
    routes: MokaCache<RouteKey, Arc<RouteQuote>>,
}

impl<P> CachedPricer<P> {
    /// Create a new cached pricer.
    pub fn new(inner: P, config: &CacheConfig) -> Self {
        let routes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, routes }
    }

    /// Access the underlying pricer for operations that bypass the cache.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Get cache statistics (for monitoring).
    pub fn cache_entry_count(&self) -> u64 {
        self.routes.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.routes.invalidate_all();
    }
}

impl<P: RoutePricer + Send + Sync> RoutePricer for CachedPricer<P> {
    async fn price_route(
        &self,
        origin: &StationId,
        destination: &StationId,
        departure: Timestamp,
        passenger: &PassengerContext,
    ) -> Result<RouteQuote, PricingError> {
        let key = (
            origin.clone(),
            destination.clone(),
            departure.timestamp(),
            passenger.clone(),
        );

        // Try cache first
        if let Some(cached) = self.routes.get(&key).await {
            trace!(from = %origin, to = %destination, "route cache hit");
            return Ok(cached.as_ref().clone());
        }

        let quote = self
            .inner
            .price_route(origin, destination, departure, passenger)
            .await?;

        self.routes.insert(key, Arc::new(quote.clone())).await;

        Ok(quote)
    }
}
