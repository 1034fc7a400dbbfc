// Domain error taxonomy for the scan pipeline.
//
// Only conditions the caller must act on live here. A backend that answers
// `success: false` is not an error (it becomes a failed ScanResult), and a
// malformed payload degrades through the fallback rules in scan::normalize.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// A platform identifier outside the closed set. Raised before any
    /// network call is attempted.
    #[error("unknown platform '{0}' (expected one of: twitter, reddit, youtube, gnews, newsapi, all)")]
    UnknownPlatform(String),

    /// The backend could not be reached or did not answer with JSON.
    #[error("unable to reach the scanning backend: {0}")]
    NetworkFailure(String),

    /// A report was requested but there is no successful scan to read.
    #[error("no successful scan available; run a scan first")]
    NoScanAvailable,
}

impl DashboardError {
    /// User-facing guidance shown in the results area for transport failures.
    pub fn guidance(&self) -> &'static str {
        match self {
            DashboardError::NetworkFailure(_) => {
                "Could not connect to the threat detection API. Make sure the backend is running and reachable."
            }
            DashboardError::UnknownPlatform(_) => "Choose one of the supported platforms.",
            DashboardError::NoScanAvailable => "Run an analysis first.",
        }
    }
}
