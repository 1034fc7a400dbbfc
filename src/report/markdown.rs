// Markdown report renderer.
//
// The first page carries the title, metadata and summary; threat sections
// follow, `sections_per_page` to a page.

use std::fmt::Write;

use anyhow::Result;

use super::export::{DocumentRenderer, RenderedArtifact};
use super::{Document, Field, LOG_HEADING, SUMMARY_HEADING};

const PAGE_BREAK: &str = "\n---\n\n";

pub struct MarkdownRenderer {
    pub sections_per_page: usize,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self {
            sections_per_page: 10,
        }
    }
}

impl DocumentRenderer for MarkdownRenderer {
    fn extension(&self) -> &'static str {
        "md"
    }

    fn render(&self, document: &Document) -> Result<RenderedArtifact> {
        let mut pages = Vec::new();

        let mut front = String::new();
        writeln!(front, "# {}\n", document.title)?;
        write_fields(&mut front, &document.metadata)?;
        writeln!(front, "\n## {SUMMARY_HEADING}\n")?;
        write_fields(&mut front, &document.summary)?;
        writeln!(front, "\n## {LOG_HEADING}")?;
        if document.sections.is_empty() {
            writeln!(front, "\nNo threats detected.")?;
        }
        pages.push(front);

        for chunk in document.sections.chunks(self.sections_per_page.max(1)) {
            let mut page = String::new();
            for section in chunk {
                writeln!(page, "### {}\n", section.heading)?;
                write_fields(&mut page, &section.fields)?;
                page.push('\n');
            }
            pages.push(page);
        }

        Ok(RenderedArtifact::new(pages, PAGE_BREAK))
    }
}

fn write_fields(out: &mut String, fields: &[Field]) -> std::fmt::Result {
    for field in fields {
        // Multi-line content stays inside its list item.
        let value = field.value.replace('\n', "\n  ");
        writeln!(out, "- **{}:** {}", field.label, value)?;
    }
    Ok(())
}
