//! Exchange-rate acquisition: cache, fetch cascade and static fallback.
//!
//! The single entry point is [`RateProvider::matrix`], which always produces a usable
//! [`RateMatrix`] and never returns an error: a fresh cached matrix if one exists, a
//! freshly fetched one otherwise, and a hardcoded approximate matrix when neither the
//! cache nor any candidate pivot can be reached. Display quality degrades under
//! failure; correctness of the caller never does.

mod source;
#[cfg(test)]
pub(crate) mod testing;

pub use source::ExchangeRateApi;

use crate::Result;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// How long a cached matrix stays fresh.
pub const CACHE_MAX_AGE_MS: i64 = 3600 * 1000;

/// Pivots tried after the preferred one, in order. Free tiers of rate APIs commonly
/// restrict which base currencies may be requested, so a denied preferred pivot falls
/// through to one of these.
const FALLBACK_PIVOTS: [&str; 2] = ["USD", "EUR"];

/// A table of exchange rates, each expressed relative to `pivot`.
///
/// The cross-rate formula in `convert` is pivot-agnostic, but the pivot is tagged here
/// anyway so cache entries are keyed by the pivot the source actually used, which may
/// differ from the one requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateMatrix {
    pivot: String,
    rates: BTreeMap<String, Decimal>,
}

impl RateMatrix {
    pub fn new(pivot: impl Into<String>, rates: BTreeMap<String, Decimal>) -> Self {
        Self {
            pivot: pivot.into(),
            rates,
        }
    }

    pub fn pivot(&self) -> &str {
        &self.pivot
    }

    pub fn rate(&self, code: &str) -> Option<Decimal> {
        self.rates.get(code).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn rates(&self) -> &BTreeMap<String, Decimal> {
        &self.rates
    }
}

/// A cached matrix together with the time it was fetched.
#[derive(Debug, Clone)]
pub struct CachedRates {
    pub matrix: RateMatrix,
    /// Epoch milliseconds at fetch time.
    pub fetched_at_ms: i64,
}

impl CachedRates {
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms - self.fetched_at_ms < CACHE_MAX_AGE_MS
    }
}

/// A source of "latest rates for base X" data.
#[async_trait::async_trait]
pub trait RateSource: Send + Sync {
    /// Fetch the latest matrix pivoted at `pivot`. The returned matrix reports the
    /// pivot the source actually used, which may differ from the requested one.
    async fn latest(&self, pivot: &str) -> Result<RateMatrix>;
}

/// Persistence for fetched matrices, one entry per pivot.
#[async_trait::async_trait]
pub trait RateStore: Send + Sync {
    /// Look up the cached matrix for `pivot`. A malformed stored entry is a miss
    /// (`Ok(None)`), not an error.
    async fn get(&self, pivot: &str) -> Result<Option<CachedRates>>;

    /// Store `matrix` keyed by its own pivot.
    async fn put(&self, matrix: &RateMatrix, fetched_at_ms: i64) -> Result<()>;
}

/// Produces rate matrices with caching and multi-pivot fallback.
pub struct RateProvider {
    source: Box<dyn RateSource>,
    store: Box<dyn RateStore>,
    /// Serializes fetches so rapid currency switching cannot race two network calls;
    /// the waiter re-checks the cache once it holds the lock.
    fetch_lock: tokio::sync::Mutex<()>,
}

impl RateProvider {
    pub fn new(source: Box<dyn RateSource>, store: Box<dyn RateStore>) -> Self {
        Self {
            source,
            store,
            fetch_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Returns a rate matrix for `preferred_pivot`, degrading through the cache, the
    /// candidate cascade and finally the static fallback. Never fails and never
    /// returns an empty matrix.
    pub async fn matrix(&self, preferred_pivot: &str) -> RateMatrix {
        if let Some(cached) = self.fresh_cached(preferred_pivot).await {
            return cached;
        }

        let _guard = self.fetch_lock.lock().await;
        // Another call may have fetched while we waited for the lock.
        if let Some(cached) = self.fresh_cached(preferred_pivot).await {
            return cached;
        }

        for candidate in candidate_pivots(preferred_pivot) {
            match self.source.latest(&candidate).await {
                Ok(matrix) if !matrix.is_empty() => {
                    debug!(
                        "fetched {} rates pivoted at {} (requested {candidate})",
                        matrix.rates().len(),
                        matrix.pivot()
                    );
                    let now_ms = chrono::Utc::now().timestamp_millis();
                    if let Err(e) = self.store.put(&matrix, now_ms).await {
                        warn!("failed to cache rates for {}: {e:#}", matrix.pivot());
                    }
                    return matrix;
                }
                Ok(_) => debug!("rate source returned an empty matrix for {candidate}"),
                Err(e) => debug!("rate fetch for pivot {candidate} failed: {e:#}"),
            }
        }

        warn!("no rate source reachable for {preferred_pivot}; using static fallback rates");
        fallback_matrix()
    }

    /// Looks up a fresh, non-empty cache entry. Store errors and stale or malformed
    /// entries all count as a miss.
    async fn fresh_cached(&self, pivot: &str) -> Option<RateMatrix> {
        let now_ms = chrono::Utc::now().timestamp_millis();
        match self.store.get(pivot).await {
            Ok(Some(cached)) if cached.is_fresh(now_ms) && !cached.matrix.is_empty() => {
                debug!("using cached rates for pivot {pivot}");
                Some(cached.matrix)
            }
            Ok(Some(_)) => {
                debug!("cached rates for pivot {pivot} are stale");
                None
            }
            Ok(None) => None,
            Err(e) => {
                debug!("rate cache lookup for {pivot} failed, treating as miss: {e:#}");
                None
            }
        }
    }
}

/// The cascade of pivots to attempt, deduplicated while preserving order.
fn candidate_pivots(preferred: &str) -> Vec<String> {
    let mut candidates = vec![preferred.to_string()];
    for pivot in FALLBACK_PIVOTS {
        if !candidates.iter().any(|c| c == pivot) {
            candidates.push(pivot.to_string());
        }
    }
    candidates
}

/// Static approximate rates, pivoted at USD. Used only when every other tier has
/// failed, so that conversion keeps working (approximately) offline.
pub fn fallback_matrix() -> RateMatrix {
    let rates: BTreeMap<String, Decimal> = [
        ("USD", Decimal::ONE),
        ("EUR", Decimal::new(92, 2)),       // 0.92
        ("GBP", Decimal::new(79, 2)),       // 0.79
        ("COP", Decimal::new(4000, 0)),     // 4000
        ("MXN", Decimal::new(1750, 2)),     // 17.50
        ("BRL", Decimal::new(520, 2)),      // 5.20
        ("JPY", Decimal::new(150, 0)),      // 150
        ("CAD", Decimal::new(136, 2)),      // 1.36
        ("CHF", Decimal::new(88, 2)),       // 0.88
        ("ARS", Decimal::new(1000, 0)),     // 1000
    ]
    .into_iter()
    .map(|(code, rate)| (code.to_string(), rate))
    .collect();
    RateMatrix::new("USD", rates)
}

#[cfg(test)]
mod tests {
    use super::testing::{MemoryStore, ScriptedSource};
    use super::*;

    fn matrix(pivot: &str, entries: &[(&str, i64)]) -> RateMatrix {
        let rates = entries
            .iter()
            .map(|(code, rate)| (code.to_string(), Decimal::from(*rate)))
            .collect();
        RateMatrix::new(pivot, rates)
    }

    #[test]
    fn test_candidate_pivots_dedup() {
        assert_eq!(candidate_pivots("COP"), vec!["COP", "USD", "EUR"]);
        assert_eq!(candidate_pivots("USD"), vec!["USD", "EUR"]);
        assert_eq!(candidate_pivots("EUR"), vec!["EUR", "USD"]);
    }

    #[test]
    fn test_fallback_matrix_is_usd_pivoted() {
        let fallback = fallback_matrix();
        assert_eq!(fallback.pivot(), "USD");
        assert_eq!(fallback.rate("USD"), Some(Decimal::ONE));
        assert!(!fallback.is_empty());
    }

    #[tokio::test]
    async fn test_fresh_cache_suppresses_network() {
        let source = ScriptedSource::default();
        let calls = source.calls();
        let store = MemoryStore::default();
        store
            .seed(
                matrix("COP", &[("COP", 1), ("USD", 1)]),
                chrono::Utc::now().timestamp_millis(),
            )
            .await;

        let provider = RateProvider::new(Box::new(source), Box::new(store));
        let result = provider.matrix("COP").await;

        assert_eq!(result.pivot(), "COP");
        assert!(calls.lock().unwrap().is_empty(), "no network call expected");
    }

    #[tokio::test]
    async fn test_stale_cache_triggers_fetch() {
        let source = ScriptedSource::default();
        source.respond("COP", matrix("COP", &[("COP", 1), ("USD", 1)]));
        let calls = source.calls();
        let store = MemoryStore::default();
        let stale = chrono::Utc::now().timestamp_millis() - CACHE_MAX_AGE_MS - 1;
        store
            .seed(matrix("COP", &[("COP", 1), ("USD", 1)]), stale)
            .await;

        let provider = RateProvider::new(Box::new(source), Box::new(store));
        let result = provider.matrix("COP").await;

        assert_eq!(result.pivot(), "COP");
        assert_eq!(calls.lock().unwrap().as_slice(), ["COP"]);
    }

    #[tokio::test]
    async fn test_cascade_tries_candidates_in_order() {
        // COP fails (tier restriction), USD succeeds; EUR must not be attempted.
        let source = ScriptedSource::default();
        source.respond("USD", matrix("USD", &[("USD", 1), ("COP", 4000)]));
        let calls = source.calls();

        let provider = RateProvider::new(Box::new(source), Box::new(MemoryStore::default()));
        let result = provider.matrix("COP").await;

        assert_eq!(result.pivot(), "USD");
        assert_eq!(calls.lock().unwrap().as_slice(), ["COP", "USD"]);
    }

    #[tokio::test]
    async fn test_total_failure_returns_static_fallback() {
        let source = ScriptedSource::default();
        let calls = source.calls();

        let provider = RateProvider::new(Box::new(source), Box::new(MemoryStore::default()));
        let result = provider.matrix("COP").await;

        assert_eq!(result.pivot(), "USD");
        assert_eq!(result.rate("COP"), Some(Decimal::from(4000)));
        // Exactly the candidate cascade was attempted, no retries.
        assert_eq!(calls.lock().unwrap().as_slice(), ["COP", "USD", "EUR"]);
    }

    #[tokio::test]
    async fn test_success_is_cached_under_actual_pivot() {
        // The source substitutes USD for the restricted COP pivot; the cache entry
        // must be keyed by USD, not COP.
        let source = ScriptedSource::default();
        source.respond("COP", matrix("USD", &[("USD", 1), ("COP", 4000)]));
        let store = MemoryStore::default();
        let entries = store.entries();

        let provider = RateProvider::new(Box::new(source), Box::new(store));
        let result = provider.matrix("COP").await;

        assert_eq!(result.pivot(), "USD");
        let entries = entries.lock().unwrap();
        assert!(entries.contains_key("USD"));
        assert!(!entries.contains_key("COP"));
    }

    #[tokio::test]
    async fn test_empty_fetch_result_falls_through() {
        let source = ScriptedSource::default();
        source.respond("COP", matrix("COP", &[]));
        source.respond("USD", matrix("USD", &[("USD", 1)]));

        let provider = RateProvider::new(Box::new(source), Box::new(MemoryStore::default()));
        let result = provider.matrix("COP").await;

        assert_eq!(result.pivot(), "USD");
    }
}
