// Scan cache: a single durable slot holding the most recent ScanResult.
//
// Two named storage keys, written in one transaction on every scan. There is no
// eviction; `is_stale` lets readers apply their own freshness rule.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::db::Storage;
use crate::scan::ScanResult;

/// Slot holding the serialized ScanResult.
pub const RESULTS_KEY: &str = "threatScanResults";
/// Slot holding the RFC 3339 capture time.
pub const TIMESTAMP_KEY: &str = "scanTimestamp";

#[derive(Clone)]
pub struct ScanCache {
    storage: Arc<dyn Storage>,
}

impl ScanCache {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Replace the cached scan. Last write wins. On error the previous
    /// result and its capture time are both left in place.
    pub async fn write(&self, result: &ScanResult) -> Result<()> {
        let json = serde_json::to_string(result).context("Failed to serialize scan result")?;
        let captured_at = Utc::now().to_rfc3339();

        self.storage
            .set_scan_states(&[(RESULTS_KEY, json.as_str()), (TIMESTAMP_KEY, captured_at.as_str())])
            .await
            .context("Failed to write scan cache")?;

        debug!(
            platform = %result.platform,
            success = result.success(),
            "Scan result cached"
        );
        Ok(())
    }

    /// The cached scan, or `None` when empty or unreadable.
    ///
    /// A corrupted slot is treated as empty rather than as an error.
    pub async fn read(&self) -> Option<ScanResult> {
        let raw = match self.storage.get_scan_state(RESULTS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read cached scan result");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(error = %e, "Cached scan result is corrupted, ignoring it");
                None
            }
        }
    }

    /// When the cached scan was written, if known.
    pub async fn captured_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.storage.get_scan_state(TIMESTAMP_KEY).await.ok()??;
        DateTime::parse_from_rfc3339(&raw)
            .map(|t| t.with_timezone(&Utc))
            .ok()
    }

    /// True when the cache is empty, has no readable capture time, or was
    /// written more than `max_age` ago.
    pub async fn is_stale(&self, max_age: Duration) -> bool {
        match self.captured_at().await {
            Some(at) => Utc::now() - at > max_age,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStorage;
    use crate::platform::Platform;

    fn cache() -> (ScanCache, Arc<dyn Storage>) {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        (ScanCache::new(storage.clone()), storage)
    }

    #[tokio::test]
    async fn test_empty_cache_reads_none_and_is_stale() {
        let (cache, _) = cache();
        assert!(cache.read().await.is_none());
        assert!(cache.is_stale(Duration::minutes(60)).await);
    }

    #[tokio::test]
    async fn test_corrupted_slot_reads_none() {
        let (cache, storage) = cache();
        storage.set_scan_state(RESULTS_KEY, "{not json").await.unwrap();
        assert!(cache.read().await.is_none());
    }

    /// Accepts one batch write, then rejects every later one.
    #[derive(Default)]
    struct OneShotStorage {
        inner: MemoryStorage,
        used: std::sync::atomic::AtomicBool,
    }

    #[async_trait::async_trait]
    impl Storage for OneShotStorage {
        async fn table_count(&self) -> Result<i64> {
            self.inner.table_count().await
        }
        async fn get_scan_state(&self, key: &str) -> Result<Option<String>> {
            self.inner.get_scan_state(key).await
        }
        async fn set_scan_state(&self, key: &str, value: &str) -> Result<()> {
            self.inner.set_scan_state(key, value).await
        }
        async fn set_scan_states(&self, entries: &[(&str, &str)]) -> Result<()> {
            if self.used.swap(true, std::sync::atomic::Ordering::SeqCst) {
                anyhow::bail!("disk full");
            }
            self.inner.set_scan_states(entries).await
        }
        async fn get_all_scan_state(&self) -> Result<Vec<(String, String)>> {
            self.inner.get_all_scan_state().await
        }
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_pair() {
        let storage: Arc<dyn Storage> = Arc::new(OneShotStorage::default());
        let cache = ScanCache::new(storage);

        let first = ScanResult::completed(Platform::Reddit, "a", 1, 0, "t", vec![]);
        cache.write(&first).await.unwrap();
        let captured = cache.captured_at().await;

        let second = ScanResult::failed(Platform::Gnews, "b", "t", "quota");
        assert!(cache.write(&second).await.is_err());
        assert_eq!(cache.read().await.unwrap(), first);
        assert_eq!(cache.captured_at().await, captured);
    }

    #[tokio::test]
    async fn test_fresh_write_is_not_stale() {
        let (cache, _) = cache();
        let result = ScanResult::completed(Platform::Reddit, "q", 1, 0, "t", vec![]);
        cache.write(&result).await.unwrap();
        assert!(!cache.is_stale(Duration::minutes(60)).await);
        assert!(cache.captured_at().await.is_some());
    }
}
