// HTML surface for the results view.
//
// Selectors are a stable contract: #resultsSection, .scan-stats,
// [data-stat], #detectionsContainer, .detection-card[data-confidence],
// canvas#confidenceChart, .no-results, .error-results, .fallback-results,
// .platform-card[data-platform] and .services-counter.
// Every interpolated string goes through html_escape.

use std::fmt::Write;

use serde::Serialize;

use crate::error::DashboardError;
use crate::poller::DashboardSummary;
use crate::scan::ServiceSummary;

use super::chart::DATASET_LABEL;
use super::{ConfidenceChart, DetectionCard, ResultsView, SummaryCounters, ViewState};

/// Escape text for use in element content and double-quoted attributes.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Full dashboard page: summary panel plus the results section.
pub fn render_page(view: &ResultsView, summary: Option<&DashboardSummary>) -> String {
    let mut page = String::new();
    page.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Threat Detection Dashboard</title>\n</head>\n<body>\n",
    );
    page.push_str(&render_summary(summary));
    page.push_str(&render_results(view));
    page.push_str("</body>\n</html>\n");
    page
}

/// The `#resultsSection` fragment on its own.
pub fn render_results(view: &ResultsView) -> String {
    let mut out = String::new();
    let hidden = if view.state == ViewState::Idle { " hidden" } else { "" };
    let _ = writeln!(out, "<section id=\"resultsSection\"{hidden}>");
    let _ = writeln!(out, "<div id=\"detectionsContainer\">");

    match &view.state {
        ViewState::Idle => {}
        ViewState::Detections {
            counters,
            cards,
            services,
            ..
        } => {
            out.push_str(&render_services(services));
            out.push_str(&render_counters(counters));
            for card in cards {
                out.push_str(&render_card(card));
            }
        }
        ViewState::NoThreats {
            platform,
            query,
            services,
        } => {
            out.push_str(&render_services(services));
            let _ = writeln!(
                out,
                "<div class=\"no-results\">\n<h4>No threats detected</h4>\n\
                 <p>No threatening content found with \"{}\" on {}.</p>\n\
                 <p>This platform appears clean for these search terms.</p>\n</div>",
                html_escape(query),
                html_escape(platform.display_name())
            );
        }
        ViewState::Error { message } => {
            let _ = writeln!(
                out,
                "<div class=\"error-results\">\n<h4>Scan Error</h4>\n\
                 <p>Error: {}</p>\n<p>Please try again.</p>\n</div>",
                html_escape(message)
            );
        }
        ViewState::Unreachable { message } => {
            let guidance = DashboardError::NetworkFailure(String::new()).guidance();
            let _ = writeln!(
                out,
                "<div class=\"fallback-results\">\n<h4>Backend unavailable</h4>\n\
                 <p>{}</p>\n<p class=\"detail\">{}</p>\n</div>",
                html_escape(guidance),
                html_escape(message)
            );
        }
    }

    out.push_str("</div>\n");
    if let Some(chart) = &view.chart {
        out.push_str(&render_chart(chart));
    }
    out.push_str("</section>\n");
    out
}

/// One `[data-platform]` card per aggregate service, in service order.
/// Empty for single-platform scans.
fn render_services(services: &[ServiceSummary]) -> String {
    if services.is_empty() {
        return String::new();
    }
    let scanned = services.iter().filter(|s| s.success).count();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<div class=\"platform-grid\">\n<p>Services scanned: <span class=\"services-counter\">{scanned}</span></p>"
    );
    for service in services {
        let status = match (service.success, service.has_threats()) {
            (false, _) => "unavailable",
            (true, true) => "has-threats",
            (true, false) => "clean",
        };
        let _ = writeln!(
            out,
            "<div class=\"platform-card\" data-platform=\"{}\">\n<h5>{}</h5> <span class=\"status-indicator {status}\"></span>\n\
             <div class=\"platform-stats\"><div class=\"stat\"><span class=\"stat-number\">{}</span><span class=\"stat-label\">Threats</span></div>\
             <div class=\"stat\"><span class=\"stat-number\">{}</span><span class=\"stat-label\">Scanned</span></div></div>\n</div>",
            service.platform.as_str(),
            html_escape(service.platform.display_name()),
            service.threats_found,
            service.items_scanned
        );
    }
    out.push_str("</div>\n");
    out
}

fn render_counters(counters: &SummaryCounters) -> String {
    format!(
        "<div class=\"scan-stats\">\n\
         <div class=\"stat-item\"><span class=\"stat-number\" data-stat=\"threats\">{}</span><span class=\"stat-label\">Threats Found</span></div>\n\
         <div class=\"stat-item\"><span class=\"stat-number\" data-stat=\"scanned\">{}</span><span class=\"stat-label\">Items Scanned</span></div>\n\
         <div class=\"stat-item\"><span class=\"stat-number\" data-stat=\"rate\">{}%</span><span class=\"stat-label\">Detection Rate</span></div>\n\
         </div>\n",
        counters.threats_found, counters.items_scanned, counters.detection_rate
    )
}

fn render_card(card: &DetectionCard) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<div class=\"detection-card\" data-confidence=\"{}\">",
        card.level.as_str()
    );
    let _ = writeln!(
        out,
        "<div class=\"detection-header\"><strong>{}</strong> <span class=\"detection-type\">{}</span> \
         <span class=\"confidence-badge confidence-{}\">{}% Confidence</span></div>",
        html_escape(&card.author),
        card.type_label,
        card.level.as_str(),
        card.confidence_percent
    );
    let _ = writeln!(out, "<div class=\"detection-content\">{}</div>", html_escape(&card.body));
    let _ = write!(
        out,
        "<div class=\"detection-meta\"><span class=\"detection-time\">{}</span>",
        html_escape(&card.time)
    );
    if !card.keywords.is_empty() {
        let _ = write!(
            out,
            " <span class=\"detection-keywords\">{}</span>",
            html_escape(&card.keywords.join(", "))
        );
    }
    if let Some(url) = &card.source_url {
        let _ = write!(
            out,
            " <a href=\"{}\" target=\"_blank\" rel=\"noopener\" class=\"view-original\">View Original</a>",
            html_escape(url)
        );
    }
    out.push_str("</div>\n</div>\n");
    out
}

fn render_chart(chart: &ConfidenceChart) -> String {
    format!(
        "<canvas id=\"confidenceChart\" aria-label=\"{}\" data-revision=\"{}\" data-labels=\"{}\" data-scores=\"{}\" data-colors=\"{}\"></canvas>\n",
        html_escape(DATASET_LABEL),
        chart.revision,
        json_attr(&chart.labels),
        json_attr(&chart.scores),
        json_attr(&chart.background_colors),
    )
}

fn json_attr<T: Serialize + ?Sized>(value: &T) -> String {
    html_escape(&serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string()))
}

fn render_summary(summary: Option<&DashboardSummary>) -> String {
    let Some(summary) = summary else {
        return String::new();
    };
    let mut out = String::from("<section id=\"dashboardSummary\" class=\"summary-panel\">\n");
    let _ = writeln!(
        out,
        "<span data-summary=\"status\">{}</span> <span data-summary=\"threats\">{}</span> \
         <span data-summary=\"services\">{}</span> <span data-summary=\"updated\">{}</span>",
        html_escape(&summary.backend_status),
        summary.total_threats_found,
        summary.services_scanned,
        html_escape(&summary.refreshed_at.to_rfc3339())
    );
    for (name, health) in &summary.services {
        let _ = writeln!(
            out,
            "<span class=\"service-status\" data-service=\"{}\">{}</span>",
            html_escape(name),
            health.as_str()
        );
    }
    out.push_str("</section>\n");
    out
}
