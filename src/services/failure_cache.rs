use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct FailureInfo {
    pub failed_at: DateTime<Utc>,
    pub error_type: FailureType,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FailureType {
    NotFound,
    RateLimited,
    ApiError,
}

/// Thread-safe cache of tickers whose provider lookups recently failed.
/// Known-bad tickers are skipped until their TTL expires so the refresh pass
/// does not burn free-tier quota re-asking the same dead symbols.
#[derive(Clone)]
pub struct FailureCache {
    cache: Arc<DashMap<String, FailureInfo>>,
}

impl FailureCache {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(DashMap::new()),
        }
    }

    pub fn is_failed(&self, ticker: &str) -> Option<FailureInfo> {
        if let Some(entry) = self.cache.get(ticker) {
            let info = entry.value().clone();
            let expiry = info.failed_at + Duration::hours(info.ttl_hours);

            if Utc::now() < expiry {
                return Some(info);
            }
            drop(entry);
            self.cache.remove(ticker);
        }
        None
    }

    pub fn record_failure(&self, ticker: &str, error_type: FailureType) {
        let ttl_hours = match error_type {
            FailureType::NotFound => 24,
            FailureType::RateLimited => 1,
            FailureType::ApiError => 6,
        };

        let info = FailureInfo {
            failed_at: Utc::now(),
            error_type,
            ttl_hours,
        };

        self.cache.insert(ticker.to_string(), info);
    }

    pub fn clear(&self, ticker: &str) {
        self.cache.remove(ticker);
    }
}

impl Default for FailureCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_retrieves_failures() {
        let cache = FailureCache::new();

        cache.record_failure("INVALID", FailureType::NotFound);

        let result = cache.is_failed("INVALID");
        assert!(result.is_some());
        assert_eq!(result.unwrap().error_type, FailureType::NotFound);
    }

    #[test]
    fn clear_removes_ticker() {
        let cache = FailureCache::new();

        cache.record_failure("TEST", FailureType::ApiError);
        assert!(cache.is_failed("TEST").is_some());

        cache.clear("TEST");
        assert!(cache.is_failed("TEST").is_none());
    }

    #[test]
    fn ttl_depends_on_failure_class() {
        let cache = FailureCache::new();

        cache.record_failure("GONE", FailureType::NotFound);
        cache.record_failure("BUSY", FailureType::RateLimited);

        assert_eq!(cache.is_failed("GONE").unwrap().ttl_hours, 24);
        assert_eq!(cache.is_failed("BUSY").unwrap().ttl_hours, 1);
    }
}
