// HTTP client for the scanning backend's JSON query endpoints.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::DashboardError;

use super::ScanBackend;

/// Default backend base URL (the Flask service's `/api` prefix).
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api";

/// Thin reqwest wrapper with a single GET-and-decode helper.
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("threatscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ScanBackend for BackendClient {
    async fn fetch(
        &self,
        endpoint: &str,
        params: &[(&'static str, String)],
    ) -> Result<Value, DashboardError> {
        let url = format!("{}{}", self.base_url, endpoint);

        debug!(endpoint = endpoint, "Backend GET request");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| DashboardError::NetworkFailure(format!("{endpoint}: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DashboardError::NetworkFailure(format!("{endpoint}: {e}")))?;

        let parsed = serde_json::from_str::<Value>(&body);

        if status.is_success() {
            return parsed.map_err(|e| {
                DashboardError::NetworkFailure(format!("{endpoint} returned a non-JSON body: {e}"))
            });
        }

        // Error statuses that still carry an envelope are normalized like
        // any other response.
        match parsed {
            Ok(value @ Value::Object(_)) => {
                warn!(endpoint = endpoint, status = %status, "Backend returned an error envelope");
                Ok(value)
            }
            _ => Err(DashboardError::NetworkFailure(format!(
                "{endpoint} returned {status}"
            ))),
        }
    }
}
