// Canonical scan model: the platform-independent shapes that flow from the
// normalizer into the cache, the renderer and the report assembler.

use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// Sentinel author for items whose payload names nobody.
pub const UNKNOWN_AUTHOR: &str = "Unknown User";
/// Sentinel body for items with no content, preview or title.
pub const NO_CONTENT: &str = "No content available";
/// Error text for failed envelopes that don't say why.
pub const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Video,
    Comment,
    Article,
    Post,
    Generic,
}

impl ContentType {
    /// Map a raw backend `type` value. Unrecognized values become `Generic`.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "video" => ContentType::Video,
            "comment" => ContentType::Comment,
            "article" | "news_article" => ContentType::Article,
            "post" | "tweet" => ContentType::Post,
            _ => ContentType::Generic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Video => "video",
            ContentType::Comment => "comment",
            ContentType::Article => "article",
            ContentType::Post => "post",
            ContentType::Generic => "content",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One flagged item, normalized across platforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub author: String,
    pub content_type: ContentType,
    /// Backend-assigned score in [0, 1]. Opaque to this crate.
    pub confidence: Option<f64>,
    pub body: String,
    /// ISO-8601 string as sent by the backend, if any.
    pub timestamp: Option<String>,
    pub keywords: Vec<String>,
    pub source_url: Option<String>,
}

impl Detection {
    /// Confidence with a missing score read as zero.
    pub fn confidence_or_zero(&self) -> f64 {
        self.confidence.unwrap_or(0.0)
    }
}

/// Whether the backend call produced results.
///
/// A failed scan carries only its error; detections cannot exist on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome {
    Completed { detections: Vec<Detection> },
    Failed { error: String },
}

/// One service's line in an aggregate scan, failed services included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub platform: Platform,
    pub success: bool,
    pub items_scanned: u64,
    pub threats_found: u64,
}

impl ServiceSummary {
    pub fn from_result(result: &ScanResult) -> Self {
        Self {
            platform: result.platform,
            success: result.success(),
            items_scanned: result.items_scanned,
            threats_found: result.threats_found,
        }
    }

    /// Whether the card shows as `has-threats` rather than `clean`.
    pub fn has_threats(&self) -> bool {
        self.threats_found > 0
    }
}

/// The outcome of one query against one platform, or the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub platform: Platform,
    pub query: String,
    pub items_scanned: u64,
    /// Backend-reported count. Trusted as-is even when it disagrees with
    /// `detections().len()`.
    pub threats_found: u64,
    pub timestamp: String,
    pub outcome: ScanOutcome,
    /// Per-service breakdown in service order. Only aggregate scans fill it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ServiceSummary>,
}

impl ScanResult {
    pub fn completed(
        platform: Platform,
        query: impl Into<String>,
        items_scanned: u64,
        threats_found: u64,
        timestamp: impl Into<String>,
        detections: Vec<Detection>,
    ) -> Self {
        Self {
            platform,
            query: query.into(),
            items_scanned,
            threats_found,
            timestamp: timestamp.into(),
            outcome: ScanOutcome::Completed { detections },
            services: Vec::new(),
        }
    }

    /// Attach the per-service breakdown of an aggregate scan.
    pub fn with_services(mut self, services: Vec<ServiceSummary>) -> Self {
        self.services = services;
        self
    }

    /// Services in the breakdown that answered successfully.
    pub fn services_scanned(&self) -> usize {
        self.services.iter().filter(|s| s.success).count()
    }

    /// A failed scan. Blank error text is replaced with the generic sentinel.
    pub fn failed(
        platform: Platform,
        query: impl Into<String>,
        timestamp: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        let error = error.into();
        let error = if error.trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            error
        };
        Self {
            platform,
            query: query.into(),
            items_scanned: 0,
            threats_found: 0,
            timestamp: timestamp.into(),
            outcome: ScanOutcome::Failed { error },
            services: Vec::new(),
        }
    }

    pub fn success(&self) -> bool {
        matches!(self.outcome, ScanOutcome::Completed { .. })
    }

    /// Detections in backend order; always empty for a failed scan.
    pub fn detections(&self) -> &[Detection] {
        match &self.outcome {
            ScanOutcome::Completed { detections } => detections,
            ScanOutcome::Failed { .. } => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            ScanOutcome::Completed { .. } => None,
            ScanOutcome::Failed { error } => Some(error),
        }
    }

    /// `round(threats / scanned * 100)`, or 0 when nothing was scanned.
    pub fn detection_rate(&self) -> u64 {
        detection_rate(self.threats_found, self.items_scanned)
    }
}

/// Percentage of scanned items flagged, rounded. Zero when `items_scanned`
/// is zero.
pub fn detection_rate(threats_found: u64, items_scanned: u64) -> u64 {
    if items_scanned == 0 {
        return 0;
    }
    (threats_found as f64 / items_scanned as f64 * 100.0).round() as u64
}
