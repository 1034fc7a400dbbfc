// Report export: Document -> renderer -> finalized artifact on disk.
//
// Renderers are the boundary to whatever produces the final bytes. Some
// paginating engines emit an empty first page; `finalize` strips blank
// leading pages before anything is written.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::platform::Platform;

use super::Document;

/// Turns a Document into paged output.
pub trait DocumentRenderer: Send + Sync {
    /// File extension without the dot (e.g. "md", "pdf").
    fn extension(&self) -> &'static str;

    fn render(&self, document: &Document) -> Result<RenderedArtifact>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub pages: Vec<String>,
    /// Inserted between pages when the artifact is written out.
    pub page_separator: &'static str,
}

impl RenderedArtifact {
    pub fn new(pages: Vec<String>, page_separator: &'static str) -> Self {
        Self {
            pages,
            page_separator,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.pages.join(self.page_separator).into_bytes()
    }
}

/// Drop blank pages from the front of the artifact.
///
/// The last remaining page is always kept, even if blank.
pub fn finalize(mut artifact: RenderedArtifact) -> RenderedArtifact {
    let blank_leading = artifact
        .pages
        .iter()
        .take_while(|page| page.trim().is_empty())
        .count()
        .min(artifact.pages.len().saturating_sub(1));

    if blank_leading > 0 {
        debug!(pages = blank_leading, "Removing blank leading pages");
        artifact.pages.drain(..blank_leading);
    }
    artifact
}

/// `Threat-Report-<platform>-<YYYY-MM-DD>.<ext>`
pub fn artifact_filename(platform: Platform, date: NaiveDate, extension: &str) -> String {
    format!(
        "Threat-Report-{}-{}.{}",
        platform.as_str(),
        date.format("%Y-%m-%d"),
        extension
    )
}

/// Render, finalize and write a report into `output_dir`, dated today (UTC).
pub fn write_report(
    document: &Document,
    renderer: &dyn DocumentRenderer,
    output_dir: &Path,
) -> Result<PathBuf> {
    let artifact = finalize(renderer.render(document)?);

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let filename = artifact_filename(document.platform, Utc::now().date_naive(), renderer.extension());
    let path = output_dir.join(filename);
    std::fs::write(&path, artifact.to_bytes())
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    info!(
        path = %path.display(),
        pages = artifact.page_count(),
        "Report written"
    );
    Ok(path)
}
