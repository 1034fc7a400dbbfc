// Colored terminal output for the results view and the dashboard summary.
//
// Draws the same ResultsView the HTML page does; main.rs only decides when.

use colored::Colorize;

use crate::backend::ServiceHealth;
use crate::error::DashboardError;
use crate::poller::DashboardSummary;
use crate::render::{ConfidenceLevel, DetectionCard, ResultsView, SummaryCounters, ViewState};
use crate::scan::ServiceSummary;

const BODY_PREVIEW_CHARS: usize = 160;

/// Print the results view.
pub fn display_results(view: &ResultsView) {
    match &view.state {
        ViewState::Idle => {
            println!("No scan results yet. Run `threatscope scan-all` first.");
        }
        ViewState::Detections {
            platform,
            query,
            counters,
            services,
            ..
        } => {
            println!(
                "\n{}",
                format!("=== {} scan for \"{}\" ===", platform.display_name(), query).bold()
            );
            display_services(services);
            display_counters(counters);
            println!();
            for card in view.cards() {
                display_card(card);
            }
            if let Some(chart) = &view.chart {
                println!(
                    "  {}",
                    format!("confidence chart: {} bars (revision {})", chart.len(), chart.revision)
                        .dimmed()
                );
            }
        }
        ViewState::NoThreats {
            platform,
            query,
            services,
        } => {
            display_services(services);
            println!(
                "\n  {} No threatening content found with \"{}\" on {}.",
                "OK".green().bold(),
                query,
                platform.display_name()
            );
            println!("  This platform appears clean for these search terms.");
        }
        ViewState::Error { message } => {
            println!("\n  {} Scan error: {}", "x".red().bold(), message);
            println!("  Please try again.");
        }
        ViewState::Unreachable { message } => {
            let guidance = DashboardError::NetworkFailure(String::new()).guidance();
            println!("\n  {} {}", "!!".red().bold(), guidance);
            println!("  {}", message.dimmed());
        }
    }
}

fn display_services(services: &[ServiceSummary]) {
    if services.is_empty() {
        return;
    }
    let scanned = services.iter().filter(|s| s.success).count();
    println!("  Services scanned: {}", scanned.to_string().bold());
    for service in services {
        let status = match (service.success, service.has_threats()) {
            (false, _) => "FAILED".red(),
            (true, true) => "THREATS".yellow().bold(),
            (true, false) => "CLEAN".green(),
        };
        println!(
            "  {:<12} {:<8} {} threats / {} scanned",
            service.platform.display_name(),
            status,
            service.threats_found,
            service.items_scanned
        );
    }
}

fn display_counters(counters: &SummaryCounters) {
    println!(
        "  {} threats found  |  {} items scanned  |  {}% detection rate",
        counters.threats_found.to_string().red().bold(),
        counters.items_scanned,
        counters.detection_rate
    );
}

fn display_card(card: &DetectionCard) {
    println!(
        "  {:>3}. {} [{}] {}",
        card.position,
        card.author.bold(),
        card.type_label,
        colorize_level(card.level, &format!("{}% confidence", card.confidence_percent)),
    );
    println!(
        "       {}",
        super::truncate_chars(&card.body, BODY_PREVIEW_CHARS).dimmed()
    );

    let mut meta = card.time.clone();
    if !card.keywords.is_empty() {
        meta.push_str(&format!("  keywords: {}", card.keywords.join(", ")));
    }
    if let Some(url) = &card.source_url {
        meta.push_str(&format!("  {url}"));
    }
    println!("       {}", meta.dimmed());
}

/// Print the poller's summary panel.
pub fn display_summary(summary: &DashboardSummary) {
    println!("\n{}", "=== Dashboard Summary ===".bold());
    println!("  Backend: {}", summary.backend_status);
    for (name, health) in &summary.services {
        println!("  {:<10} {}", name, colorize_health(*health));
    }
    println!(
        "  Recent threats: {}  |  Services scanned: {}",
        summary.total_threats_found, summary.services_scanned
    );
    if let Some(error) = &summary.last_error {
        println!("  {} {}", "last refresh failed:".yellow(), error);
    }
    println!(
        "  {}",
        format!("updated {}", summary.refreshed_at.format("%H:%M:%S UTC")).dimmed()
    );
}

fn colorize_level(level: ConfidenceLevel, text: &str) -> colored::ColoredString {
    match level {
        ConfidenceLevel::High => text.red().bold(),
        ConfidenceLevel::Medium => text.yellow(),
        ConfidenceLevel::Low => text.bright_yellow().dimmed(),
    }
}

fn colorize_health(health: ServiceHealth) -> colored::ColoredString {
    let label = health.as_str().to_uppercase();
    match health {
        ServiceHealth::Available => label.green(),
        ServiceHealth::Unavailable => label.yellow(),
        ServiceHealth::Error => label.red(),
    }
}
