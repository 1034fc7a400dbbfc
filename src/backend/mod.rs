// Scanning backend: the network seam.
//
// Everything that talks to the backend goes through the ScanBackend trait so
// the session controller and poller can be driven by a mock in tests.

pub mod client;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DashboardError;
use crate::platform::adapter::HEALTH_ENDPOINT;

pub use client::{BackendClient, DEFAULT_API_URL};

#[async_trait]
pub trait ScanBackend: Send + Sync {
    /// GET `<base><endpoint>?params` and return the JSON body.
    ///
    /// Transport errors, non-JSON bodies and non-2xx responses without a
    /// JSON object body are `NetworkFailure`.
    async fn fetch(
        &self,
        endpoint: &str,
        params: &[(&'static str, String)],
    ) -> Result<Value, DashboardError>;

    /// Fetch and decode the backend's health document.
    async fn health(&self) -> Result<HealthResponse, DashboardError> {
        let raw = self.fetch(HEALTH_ENDPOINT, &[]).await?;
        serde_json::from_value(raw)
            .map_err(|e| DashboardError::NetworkFailure(format!("malformed health response: {e}")))
    }
}

/// Per-service availability as reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceHealth {
    Available,
    Unavailable,
    #[serde(other)]
    Error,
}

impl ServiceHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceHealth::Available => "available",
            ServiceHealth::Unavailable => "unavailable",
            ServiceHealth::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub services: BTreeMap<String, ServiceHealth>,
}

impl HealthResponse {
    pub fn available_count(&self) -> usize {
        self.services
            .values()
            .filter(|s| **s == ServiceHealth::Available)
            .count()
    }
}
