// Report assembler: cached ScanResult -> linear Document.
//
// Assembly is pure. It reads a result that has already been normalized and
// never triggers network I/O. Turning the Document into bytes is the job of
// a DocumentRenderer (see export).

pub mod export;
pub mod markdown;

use serde::Serialize;

use crate::error::DashboardError;
use crate::platform::Platform;
use crate::render::format_timestamp;
use crate::scan::{Detection, ScanResult};

pub use export::{artifact_filename, finalize, write_report, DocumentRenderer, RenderedArtifact};
pub use markdown::MarkdownRenderer;

pub const LOG_HEADING: &str = "Detailed Threat Log";
pub const SUMMARY_HEADING: &str = "Summary";

/// A labelled value (`**Label:** value`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
}

impl Field {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// One per detection, in backend order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub heading: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub platform: Platform,
    pub title: String,
    pub metadata: Vec<Field>,
    pub summary: Vec<Field>,
    pub sections: Vec<Section>,
}

/// Build the report document for a successful scan.
///
/// `platform_label` is upper-cased into the title. Fails with
/// `NoScanAvailable` when the scan did not succeed.
pub fn assemble(result: &ScanResult, platform_label: &str) -> Result<Document, DashboardError> {
    if !result.success() {
        return Err(DashboardError::NoScanAvailable);
    }

    let metadata = vec![
        Field::new("Platform", result.platform.as_str()),
        Field::new("Keywords", result.query.as_str()),
        Field::new("Scan Time", format_timestamp(Some(&result.timestamp))),
    ];

    let summary = vec![
        Field::new("Items Scanned", result.items_scanned.to_string()),
        Field::new("Threats Found", result.threats_found.to_string()),
        Field::new("Detection Rate", format!("{}%", result.detection_rate())),
    ];

    let sections = result
        .detections()
        .iter()
        .enumerate()
        .map(|(i, d)| threat_section(i + 1, d))
        .collect();

    Ok(Document {
        platform: result.platform,
        title: format!("{} Threat Analysis Report", platform_label.to_uppercase()),
        metadata,
        summary,
        sections,
    })
}

fn threat_section(position: usize, detection: &Detection) -> Section {
    let mut fields = vec![
        Field::new(
            "Confidence",
            format!("{}%", (detection.confidence_or_zero() * 100.0).round() as u64),
        ),
        Field::new("Author", detection.author.as_str()),
        Field::new("Type", detection.content_type.as_str()),
        Field::new("Time", format_timestamp(detection.timestamp.as_deref())),
        Field::new("Content", detection.body.as_str()),
    ];

    if !detection.keywords.is_empty() {
        fields.push(Field::new("Keywords Found", detection.keywords.join(", ")));
    }
    if let Some(url) = &detection.source_url {
        fields.push(Field::new("URL", url.as_str()));
    }

    Section {
        heading: format!("Threat #{position}"),
        fields,
    }
}
