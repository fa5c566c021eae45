//! Reverse geocoding of donation locations.
//!
//! Lookups go through an [`AddressResolver`], usually backed by a map
//! provider. Every lookup is bounded by a timeout and falls back to the
//! coordinate's region label, so a slow or failing provider never blocks a
//! donation view.

use crate::error::{Error, Result};
use myocean_geo::Coordinate;
use std::collections::HashMap;
use std::future::Future;
use std::sync::RwLock;
use std::time::Duration;

/// Default lookup timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3000);

/// Turns a coordinate into a human-readable address.
pub trait AddressResolver: Send + Sync {
    fn resolve(&self, coordinate: Coordinate) -> impl Future<Output = Result<String>> + Send;
}

/// Resolve `coordinate`, falling back to its region label on error, empty
/// answer or timeout.
pub async fn resolve_with_fallback<R: AddressResolver>(
    resolver: &R,
    coordinate: Coordinate,
    timeout: Duration,
) -> String {
    let outcome = match tokio::time::timeout(timeout, resolver.resolve(coordinate)).await {
        Ok(result) => result,
        Err(_) => Err(Error::address_timeout(timeout)),
    };

    match outcome {
        Ok(address) if !address.trim().is_empty() => address,
        Ok(_) => {
            tracing::debug!(key = %coordinate.cache_key(), "Empty address, using region label");
            coordinate.region_label()
        }
        Err(e) => {
            tracing::warn!(
                key = %coordinate.cache_key(),
                error = %e,
                "Address lookup failed, using region label"
            );
            coordinate.region_label()
        }
    }
}

/// Caching front for an [`AddressResolver`].
///
/// Answers are keyed by the coordinate's `"lat,lng"` text. Fallback labels
/// are cached too, so a coordinate is only looked up once.
pub struct AddressBook<R> {
    resolver: R,
    timeout: Duration,
    cache: RwLock<HashMap<String, String>>,
}

impl<R: AddressResolver> AddressBook<R> {
    pub fn new(resolver: R) -> Self {
        Self::with_timeout(resolver, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(resolver: R, timeout: Duration) -> Self {
        Self {
            resolver,
            timeout,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Cached address for `coordinate`, if any.
    pub fn cached(&self, coordinate: &Coordinate) -> Option<String> {
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        cache.get(&coordinate.cache_key()).cloned()
    }

    /// Address for `coordinate`, resolving and caching it on first use.
    pub async fn lookup(&self, coordinate: Coordinate) -> String {
        if let Some(address) = self.cached(&coordinate) {
            return address;
        }

        let address = resolve_with_fallback(&self.resolver, coordinate, self.timeout).await;
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        cache.entry(coordinate.cache_key()).or_insert(address).clone()
    }

    pub fn len(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolver over a fixed table. Unknown coordinates are not found.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    addresses: HashMap<String, String>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_address(mut self, coordinate: Coordinate, address: impl Into<String>) -> Self {
        self.addresses.insert(coordinate.cache_key(), address.into());
        self
    }
}

/// Entries keyed by `"lat,lng"`, as in an exported address cache.
impl From<HashMap<String, String>> for StaticResolver {
    fn from(addresses: HashMap<String, String>) -> Self {
        Self { addresses }
    }
}

impl AddressResolver for StaticResolver {
    async fn resolve(&self, coordinate: Coordinate) -> Result<String> {
        let key = coordinate.cache_key();
        self.addresses
            .get(&key)
            .cloned()
            .ok_or_else(|| Error::address_not_found(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const BUSAN: Coordinate = Coordinate::new(35.1, 129.1);

    struct SlowResolver;

    impl AddressResolver for SlowResolver {
        async fn resolve(&self, _coordinate: Coordinate) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    #[derive(Default)]
    struct CountingResolver {
        calls: AtomicUsize,
    }

    impl AddressResolver for CountingResolver {
        async fn resolve(&self, _coordinate: Coordinate) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("부산광역시 해운대구 우동".to_string())
        }
    }

    #[tokio::test]
    async fn test_resolves_known_address() {
        let resolver = StaticResolver::new().with_address(BUSAN, "부산광역시 해운대구");
        let address = resolve_with_fallback(&resolver, BUSAN, DEFAULT_TIMEOUT).await;
        assert_eq!(address, "부산광역시 해운대구");
    }

    #[tokio::test]
    async fn test_falls_back_on_error() {
        let address = resolve_with_fallback(&StaticResolver::new(), BUSAN, DEFAULT_TIMEOUT).await;
        assert_eq!(address, "35.10°N 129.10°E");
    }

    #[tokio::test]
    async fn test_falls_back_on_empty_answer() {
        let resolver = StaticResolver::new().with_address(BUSAN, "  ");
        let address = resolve_with_fallback(&resolver, BUSAN, DEFAULT_TIMEOUT).await;
        assert_eq!(address, BUSAN.region_label());
    }

    #[tokio::test(start_paused = true)]
    async fn test_falls_back_on_timeout() {
        let address = resolve_with_fallback(&SlowResolver, BUSAN, Duration::from_millis(50)).await;
        assert_eq!(address, BUSAN.region_label());
    }

    #[tokio::test]
    async fn test_address_book_caches() {
        let book = AddressBook::new(CountingResolver::default());
        assert!(book.is_empty());

        let first = book.lookup(BUSAN).await;
        let second = book.lookup(BUSAN).await;

        assert_eq!(first, second);
        assert_eq!(book.resolver.calls.load(Ordering::SeqCst), 1);
        assert_eq!(book.cached(&BUSAN).as_deref(), Some("부산광역시 해운대구 우동"));
        assert_eq!(book.len(), 1);
    }

    #[tokio::test]
    async fn test_address_book_caches_fallback() {
        let book = AddressBook::with_timeout(StaticResolver::new(), Duration::from_millis(100));
        book.lookup(BUSAN).await;
        assert_eq!(book.cached(&BUSAN), Some(BUSAN.region_label()));
    }
}
