// Session controller: one dashboard session's state and its scan actions.
//
// Owns the scan cache, the results view (with its chart) and the in-flight
// set. Nothing here is global; every surface (CLI, web) holds its own
// controller, usually behind an Arc.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::{debug, info, warn};

use crate::backend::ScanBackend;
use crate::cache::ScanCache;
use crate::error::DashboardError;
use crate::platform::adapter;
use crate::platform::Platform;
use crate::render::ResultsView;
use crate::report::{self, Document};
use crate::scan::{normalize, ScanResult};

/// What to do with a response that arrives after a newer one was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Whichever response lands last is cached and rendered.
    #[default]
    LastWriteWins,
    /// Responses older than the newest written one are discarded.
    SequenceFence,
}

/// Inputs used when a scan is requested without explicit parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanDefaults {
    pub query: String,
    /// Reddit takes a community instead of free text.
    pub subreddit: String,
    pub limit: u32,
}

impl Default for ScanDefaults {
    fn default() -> Self {
        Self {
            query: "harassment OR abuse".to_string(),
            subreddit: "TwoXChromosomes".to_string(),
            limit: 10,
        }
    }
}

impl ScanDefaults {
    fn query_for(&self, platform: Platform) -> &str {
        match platform {
            Platform::Reddit => &self.subreddit,
            _ => &self.query,
        }
    }
}

/// Result of asking the controller to scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanAttempt {
    /// Normalized, cached and rendered.
    Completed(ScanResult),
    /// A scan for the same platform was already running; nothing was sent.
    Ignored,
    /// Discarded by `SequenceFence` because a newer response was already
    /// written. Neither cached nor rendered.
    Stale(ScanResult),
}

/// Releases its platform's in-flight slot when dropped.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<Platform>>,
    platform: Platform,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut set = self.set.lock().unwrap_or_else(|e| e.into_inner());
        set.remove(&self.platform);
    }
}

pub struct SessionController {
    backend: Arc<dyn ScanBackend>,
    cache: ScanCache,
    view: RwLock<ResultsView>,
    in_flight: Mutex<HashSet<Platform>>,
    next_sequence: AtomicU64,
    /// Sequence number of the newest response written. Held across the
    /// cache write and render so the fence check and the write are atomic.
    newest_written: AsyncMutex<u64>,
    policy: StalePolicy,
    defaults: ScanDefaults,
}

impl SessionController {
    pub fn new(backend: Arc<dyn ScanBackend>, cache: ScanCache) -> Self {
        Self {
            backend,
            cache,
            view: RwLock::new(ResultsView::new()),
            in_flight: Mutex::new(HashSet::new()),
            next_sequence: AtomicU64::new(0),
            newest_written: AsyncMutex::new(0),
            policy: StalePolicy::default(),
            defaults: ScanDefaults::default(),
        }
    }

    pub fn with_policy(mut self, policy: StalePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_defaults(mut self, defaults: ScanDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn cache(&self) -> &ScanCache {
        &self.cache
    }

    /// Snapshot of the current render model.
    pub async fn view(&self) -> ResultsView {
        self.view.read().await.clone()
    }

    pub fn is_in_flight(&self, platform: Platform) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&platform)
    }

    /// Render whatever the cache holds (the "page load" path).
    ///
    /// Returns false and leaves the view idle when the cache is empty or
    /// unreadable.
    pub async fn restore(&self) -> bool {
        match self.cache.read().await {
            Some(result) => {
                self.view.write().await.render(&result);
                true
            }
            None => false,
        }
    }

    /// Scan every platform through the backend's aggregate endpoint.
    pub async fn scan_all(
        &self,
        query: Option<&str>,
        limit: Option<u32>,
    ) -> Result<ScanAttempt, DashboardError> {
        self.scan(Platform::All.as_str(), query, limit).await
    }

    /// Run one scan: resolve, fetch, normalize, then cache and render.
    ///
    /// Unknown platforms fail before any I/O. Transport failures switch the
    /// view to its unreachable state and are returned as `NetworkFailure`;
    /// under `SequenceFence` a failure older than the newest written
    /// response leaves the view alone.
    /// A backend-reported failure is not an error: it completes with a
    /// failed ScanResult.
    pub async fn scan(
        &self,
        platform_name: &str,
        query: Option<&str>,
        limit: Option<u32>,
    ) -> Result<ScanAttempt, DashboardError> {
        let adapter = adapter::resolve(platform_name)?;
        let platform = adapter.platform;

        let query = match query.map(str::trim) {
            Some(q) if !q.is_empty() => q.to_string(),
            _ => self.defaults.query_for(platform).to_string(),
        };
        let limit = limit.unwrap_or(self.defaults.limit);

        let Some(_guard) = self.try_acquire(platform) else {
            debug!(platform = %platform, "Scan already in flight, ignoring request");
            return Ok(ScanAttempt::Ignored);
        };

        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        info!(platform = %platform, query = %query, limit, sequence, "Starting scan");

        let raw = match self
            .backend
            .fetch(adapter.endpoint, &adapter.build_params(&query, limit))
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(platform = %platform, error = %e, "Scan request failed");
                let newest = self.newest_written.lock().await;
                if self.policy == StalePolicy::SequenceFence && sequence < *newest {
                    debug!(sequence, newest = *newest, "Keeping newer view over stale failure");
                } else {
                    self.view.write().await.render_unreachable(e.to_string());
                }
                return Err(e);
            }
        };

        let result = normalize(platform, &raw, &query);

        let mut newest = self.newest_written.lock().await;
        if self.policy == StalePolicy::SequenceFence && sequence < *newest {
            warn!(
                platform = %platform,
                sequence,
                newest = *newest,
                "Discarding stale scan response"
            );
            return Ok(ScanAttempt::Stale(result));
        }

        if let Err(e) = self.cache.write(&result).await {
            warn!(error = %e, "Failed to cache scan result");
        }
        self.view.write().await.render(&result);
        *newest = (*newest).max(sequence);

        info!(
            platform = %platform,
            success = result.success(),
            threats = result.threats_found,
            scanned = result.items_scanned,
            "Scan finished"
        );
        Ok(ScanAttempt::Completed(result))
    }

    /// Assemble a report from the cached scan. Never touches the network.
    pub async fn build_report(&self) -> Result<Document, DashboardError> {
        let result = self
            .cache
            .read()
            .await
            .ok_or(DashboardError::NoScanAvailable)?;
        report::assemble(&result, result.platform.as_str())
    }

    fn try_acquire(&self, platform: Platform) -> Option<InFlightGuard<'_>> {
        let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !set.insert(platform) {
            return None;
        }
        Some(InFlightGuard {
            set: &self.in_flight,
            platform,
        })
    }
}
