//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::{CacheConfig, CachedPricer};
use crate::split::{ScanConfig, SplitScanner};
use crate::vendo::VendoClient;

/// The scanner used by the web layer: live API behind the route cache.
pub type Scanner = SplitScanner<CachedPricer<VendoClient>>;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Journey API client for searches
    pub vendo: Arc<VendoClient>,

    /// Split scanner pricing through the cache
    pub scanner: Scanner,
}

impl AppState {
    /// Create a new app state.
    ///
    /// Searches and split scans share the client, so they share its
    /// concurrency limit.
    pub fn new(vendo: VendoClient, cache: &CacheConfig, scan: ScanConfig) -> Self {
        let pricer = CachedPricer::new(vendo.clone(), cache);

        Self {
            vendo: Arc::new(vendo),
            scanner: SplitScanner::new(pricer, scan),
        }
    }
}
