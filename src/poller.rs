// Summary poller: periodic health + headline-count refresh.
//
// Feeds the dashboard's summary panel only. It never reads or writes the
// scan cache and never takes a session's in-flight slot, so it can't
// clobber or block a user-initiated scan.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::backend::{HealthResponse, ScanBackend, ServiceHealth};
use crate::error::DashboardError;
use crate::platform::adapter::adapter_for;
use crate::platform::fields::FieldChain;
use crate::platform::Platform;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
/// The lightweight aggregate query used for headline counts.
pub const SUMMARY_QUERY: &str = "harassment";
pub const SUMMARY_LIMIT: u32 = 5;

const TOTAL_THREATS: FieldChain = FieldChain::new(&["total_threats_found"]);
const SERVICES_SCANNED: FieldChain = FieldChain::new(&["services_scanned"]);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub backend_status: String,
    pub services: BTreeMap<String, ServiceHealth>,
    pub total_threats_found: u64,
    pub services_scanned: u64,
    pub refreshed_at: DateTime<Utc>,
    pub last_error: Option<String>,
}

impl Default for DashboardSummary {
    fn default() -> Self {
        Self {
            backend_status: "unknown".to_string(),
            services: BTreeMap::new(),
            total_threats_found: 0,
            services_scanned: 0,
            refreshed_at: Utc::now(),
            last_error: None,
        }
    }
}

impl DashboardSummary {
    /// Apply an aggregate envelope. Counters the envelope omits keep their
    /// previous values.
    fn apply_counts(&mut self, raw: &Value) {
        if let Some(total) = TOTAL_THREATS.first_u64(raw) {
            self.total_threats_found = total;
        }
        if let Some(scanned) = SERVICES_SCANNED.first_u64(raw) {
            self.services_scanned = scanned;
        }
    }
}

pub struct SummaryPoller {
    backend: Arc<dyn ScanBackend>,
    summary: Arc<RwLock<DashboardSummary>>,
    interval: Duration,
}

impl SummaryPoller {
    pub fn new(backend: Arc<dyn ScanBackend>, interval: Duration) -> Self {
        Self {
            backend,
            summary: Arc::new(RwLock::new(DashboardSummary::default())),
            interval,
        }
    }

    /// Shared handle to the summary this poller updates.
    pub fn summary(&self) -> Arc<RwLock<DashboardSummary>> {
        self.summary.clone()
    }

    pub async fn snapshot(&self) -> DashboardSummary {
        self.summary.read().await.clone()
    }

    /// One refresh: health first, then the small aggregate scan.
    ///
    /// On failure the previous counters are kept and `last_error` is set.
    pub async fn refresh_once(&self) -> Result<(), DashboardError> {
        let outcome = self.fetch().await;
        let mut summary = self.summary.write().await;
        summary.refreshed_at = Utc::now();

        match outcome {
            Ok((health, counts)) => {
                summary.backend_status = health.status;
                summary.services = health.services;
                summary.apply_counts(&counts);
                summary.last_error = None;
                debug!(
                    threats = summary.total_threats_found,
                    services = summary.services_scanned,
                    "Dashboard summary refreshed"
                );
                Ok(())
            }
            Err(e) => {
                summary.backend_status = "unreachable".to_string();
                summary.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn fetch(&self) -> Result<(HealthResponse, Value), DashboardError> {
        let health = self.backend.health().await?;
        let adapter = adapter_for(Platform::All);
        let counts = self
            .backend
            .fetch(
                adapter.endpoint,
                &adapter.build_params(SUMMARY_QUERY, SUMMARY_LIMIT),
            )
            .await?;
        Ok((health, counts))
    }

    /// Refresh immediately, then every `interval`, until the task is aborted.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = self.refresh_once().await {
                    warn!(error = %e, "Dashboard summary refresh failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_apply_counts_keeps_missing_counters() {
        let mut summary = DashboardSummary::default();
        summary.apply_counts(&json!({"total_threats_found": 7, "services_scanned": 5}));
        summary.apply_counts(&json!({"services_scanned": 4}));
        assert_eq!(summary.total_threats_found, 7);
        assert_eq!(summary.services_scanned, 4);
    }
}
