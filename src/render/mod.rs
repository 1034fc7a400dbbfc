// Presentation renderer: ScanResult -> ResultsView.
//
// ResultsView is the one render model every surface draws from (HTML page,
// terminal, JSON). Rendering is idempotent: each call rebuilds the cards
// from scratch and reconciles the long-lived chart.

pub mod chart;
pub mod html;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use crate::platform::Platform;
use crate::scan::{Detection, ScanResult, ServiceSummary};

pub use chart::ConfidenceChart;

/// Lower bound of the high-confidence bucket.
pub const HIGH_CONFIDENCE: f64 = 0.8;
/// Lower bound of the medium-confidence bucket.
pub const MEDIUM_CONFIDENCE: f64 = 0.5;

/// Smallest number read as epoch seconds (2001-09-09).
const MIN_EPOCH_SECS: f64 = 1e9;

/// Shown in place of a missing or empty detection timestamp.
pub const UNKNOWN_TIME: &str = "Recent";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// Bucket a confidence score. Missing scores read as 0.
    pub fn from_confidence(confidence: Option<f64>) -> Self {
        let c = confidence.unwrap_or(0.0);
        if c >= HIGH_CONFIDENCE {
            ConfidenceLevel::High
        } else if c >= MEDIUM_CONFIDENCE {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        }
    }

    pub fn fill_color(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "rgba(220, 38, 38, 0.6)",
            ConfidenceLevel::Medium => "rgba(251, 146, 60, 0.6)",
            ConfidenceLevel::Low => "rgba(252, 211, 77, 0.6)",
        }
    }

    pub fn border_color(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "rgba(220, 38, 38, 1)",
            ConfidenceLevel::Medium => "rgba(251, 146, 60, 1)",
            ConfidenceLevel::Low => "rgba(252, 211, 77, 1)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryCounters {
    pub threats_found: u64,
    pub items_scanned: u64,
    /// Whole percent.
    pub detection_rate: u64,
}

impl SummaryCounters {
    pub fn from_result(result: &ScanResult) -> Self {
        Self {
            threats_found: result.threats_found,
            items_scanned: result.items_scanned,
            detection_rate: result.detection_rate(),
        }
    }
}

/// One rendered detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionCard {
    /// 1-based position in backend order.
    pub position: usize,
    pub author: String,
    pub type_label: &'static str,
    pub confidence_percent: u64,
    pub level: ConfidenceLevel,
    pub body: String,
    pub time: String,
    pub keywords: Vec<String>,
    pub source_url: Option<String>,
}

impl DetectionCard {
    pub fn from_detection(position: usize, detection: &Detection) -> Self {
        Self {
            position,
            author: detection.author.clone(),
            type_label: detection.content_type.as_str(),
            confidence_percent: (detection.confidence_or_zero() * 100.0).round() as u64,
            level: ConfidenceLevel::from_confidence(detection.confidence),
            body: detection.body.clone(),
            time: format_timestamp(detection.timestamp.as_deref()),
            keywords: detection.keywords.clone(),
            source_url: detection.source_url.clone(),
        }
    }
}

/// What the results area currently shows. Each variant is drawn with its
/// own distinct markup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    Idle,
    Detections {
        platform: Platform,
        query: String,
        counters: SummaryCounters,
        cards: Vec<DetectionCard>,
        /// Per-service cards; empty outside aggregate scans.
        services: Vec<ServiceSummary>,
    },
    NoThreats {
        platform: Platform,
        query: String,
        services: Vec<ServiceSummary>,
    },
    /// The backend answered with `success: false`.
    Error { message: String },
    /// The backend could not be reached at all.
    Unreachable { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsView {
    pub state: ViewState,
    pub chart: Option<ConfidenceChart>,
}

impl Default for ResultsView {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultsView {
    pub fn new() -> Self {
        Self {
            state: ViewState::Idle,
            chart: None,
        }
    }

    /// Render a scan. Calling this twice with the same result leaves the
    /// view in the same state (apart from the chart's revision counter).
    pub fn render(&mut self, result: &ScanResult) {
        let detections = result.detections();

        self.state = match result.error() {
            Some(error) => ViewState::Error {
                message: error.to_string(),
            },
            None if detections.is_empty() => ViewState::NoThreats {
                platform: result.platform,
                query: result.query.clone(),
                services: result.services.clone(),
            },
            None => ViewState::Detections {
                platform: result.platform,
                query: result.query.clone(),
                counters: SummaryCounters::from_result(result),
                cards: detections
                    .iter()
                    .enumerate()
                    .map(|(i, d)| DetectionCard::from_detection(i + 1, d))
                    .collect(),
                services: result.services.clone(),
            },
        };

        self.sync_chart(detections);
    }

    /// Show the transport-failure state and drop the chart.
    pub fn render_unreachable(&mut self, message: impl Into<String>) {
        self.state = ViewState::Unreachable {
            message: message.into(),
        };
        self.chart = None;
    }

    pub fn cards(&self) -> &[DetectionCard] {
        match &self.state {
            ViewState::Detections { cards, .. } => cards,
            _ => &[],
        }
    }

    /// The aggregate per-service breakdown, if the view shows one.
    pub fn services(&self) -> &[ServiceSummary] {
        match &self.state {
            ViewState::Detections { services, .. } | ViewState::NoThreats { services, .. } => {
                services
            }
            _ => &[],
        }
    }

    pub fn counters(&self) -> Option<SummaryCounters> {
        match &self.state {
            ViewState::Detections { counters, .. } => Some(*counters),
            _ => None,
        }
    }

    fn sync_chart(&mut self, detections: &[Detection]) {
        if detections.is_empty() {
            self.chart = None;
            return;
        }
        match self.chart.as_mut() {
            Some(chart) => chart.update(detections),
            None => self.chart = Some(ConfidenceChart::build(detections)),
        }
    }
}

/// Human-readable detection time; `"Recent"` when absent.
///
/// Accepts RFC 3339, naive ISO-8601 and epoch seconds (reddit's
/// `created_utc`) from 2001 onward. Anything else, including short numbers
/// like a bare year, is shown verbatim.
pub fn format_timestamp(raw: Option<&str>) -> String {
    let raw = match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return UNKNOWN_TIME.to_string(),
    };

    const DISPLAY: &str = "%Y-%m-%d %H:%M UTC";

    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return t.with_timezone(&Utc).format(DISPLAY).to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(raw, pattern) {
            return t.and_utc().format(DISPLAY).to_string();
        }
    }
    if let Ok(secs) = raw.parse::<f64>() {
        if secs >= MIN_EPOCH_SECS {
            if let Some(t) = DateTime::from_timestamp(secs as i64, 0) {
                return t.format(DISPLAY).to_string();
            }
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_buckets() {
        assert_eq!(ConfidenceLevel::from_confidence(Some(0.8)), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_confidence(Some(0.79)), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_confidence(Some(0.5)), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_confidence(Some(0.49)), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_confidence(None), ConfidenceLevel::Low);
    }

    #[test]
    fn test_format_timestamp_variants() {
        assert_eq!(format_timestamp(None), "Recent");
        assert_eq!(format_timestamp(Some("  ")), "Recent");
        assert_eq!(
            format_timestamp(Some("2024-03-01T10:15:00Z")),
            "2024-03-01 10:15 UTC"
        );
        assert_eq!(
            format_timestamp(Some("2024-03-01T10:15:00")),
            "2024-03-01 10:15 UTC"
        );
        assert_eq!(format_timestamp(Some("1709288100.0")), "2024-03-01 10:15 UTC");
        assert_eq!(format_timestamp(Some("yesterday")), "yesterday");
    }

    #[test]
    fn test_short_numbers_are_not_epoch_seconds() {
        assert_eq!(format_timestamp(Some("2024")), "2024");
        assert_eq!(format_timestamp(Some("0")), "0");
        assert_eq!(format_timestamp(Some("1000000000")), "2001-09-09 01:46 UTC");
    }
}
