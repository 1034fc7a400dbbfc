// Confidence bar chart model.
//
// The chart is long-lived: once built, later renders rewrite its data arrays
// in place and bump `revision` instead of constructing a new one. The owning
// view drops it entirely when there is nothing to plot.

use serde::Serialize;

use crate::scan::{ContentType, Detection};

use super::ConfidenceLevel;

pub const DATASET_LABEL: &str = "Confidence Score (%)";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceChart {
    pub labels: Vec<String>,
    /// Confidence as a percentage, 0 to 100.
    pub scores: Vec<f64>,
    pub background_colors: Vec<&'static str>,
    pub border_colors: Vec<&'static str>,
    /// 0 when constructed, +1 on every in-place update.
    pub revision: u64,
}

impl ConfidenceChart {
    /// Construct a chart for a non-empty detection list.
    pub fn build(detections: &[Detection]) -> Self {
        let mut chart = Self {
            labels: Vec::new(),
            scores: Vec::new(),
            background_colors: Vec::new(),
            border_colors: Vec::new(),
            revision: 0,
        };
        chart.fill(detections);
        chart
    }

    /// Replace the data arrays in place.
    pub fn update(&mut self, detections: &[Detection]) {
        self.fill(detections);
        self.revision += 1;
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    fn fill(&mut self, detections: &[Detection]) {
        self.labels = detections
            .iter()
            .enumerate()
            .map(|(i, d)| bar_label(d.content_type, i + 1))
            .collect();
        self.scores = detections
            .iter()
            .map(|d| d.confidence_or_zero() * 100.0)
            .collect();

        let levels: Vec<ConfidenceLevel> = detections
            .iter()
            .map(|d| ConfidenceLevel::from_confidence(d.confidence))
            .collect();
        self.background_colors = levels.iter().map(|l| l.fill_color()).collect();
        self.border_colors = levels.iter().map(|l| l.border_color()).collect();
    }
}

/// "Video #n", "Comment #n", or "Item #n" for everything else.
pub fn bar_label(content_type: ContentType, position: usize) -> String {
    let kind = match content_type {
        ContentType::Video => "Video",
        ContentType::Comment => "Comment",
        _ => "Item",
    };
    format!("{kind} #{position}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(content_type: ContentType, confidence: Option<f64>) -> Detection {
        Detection {
            author: "a".into(),
            content_type,
            confidence,
            body: "b".into(),
            timestamp: None,
            keywords: vec![],
            source_url: None,
        }
    }

    #[test]
    fn test_labels_and_scores() {
        let chart = ConfidenceChart::build(&[
            detection(ContentType::Video, Some(0.9)),
            detection(ContentType::Comment, Some(0.5)),
            detection(ContentType::Article, None),
        ]);
        assert_eq!(chart.labels, vec!["Video #1", "Comment #2", "Item #3"]);
        assert_eq!(chart.scores, vec![90.0, 50.0, 0.0]);
        assert_eq!(
            chart.background_colors,
            vec![
                "rgba(220, 38, 38, 0.6)",
                "rgba(251, 146, 60, 0.6)",
                "rgba(252, 211, 77, 0.6)"
            ]
        );
        assert_eq!(chart.revision, 0);
    }

    #[test]
    fn test_update_bumps_revision_and_replaces_data() {
        let mut chart = ConfidenceChart::build(&[detection(ContentType::Post, Some(0.2))]);
        chart.update(&[
            detection(ContentType::Post, Some(0.8)),
            detection(ContentType::Post, Some(0.85)),
        ]);
        assert_eq!(chart.revision, 1);
        assert_eq!(chart.len(), 2);
        assert_eq!(chart.border_colors[0], "rgba(220, 38, 38, 1)");
    }
}
