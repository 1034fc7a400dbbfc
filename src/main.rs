use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use threatscope::backend::{BackendClient, ScanBackend};
use threatscope::cache::ScanCache;
use threatscope::config::Config;
use threatscope::db::{self, Storage};
use threatscope::error::DashboardError;
use threatscope::output::terminal;
use threatscope::poller::SummaryPoller;
use threatscope::report::{write_report, MarkdownRenderer};
use threatscope::session::{ScanAttempt, SessionController};

/// threatscope: unified threat scan dashboard.
///
/// Runs keyword scans against the multi-platform scanning backend, shows
/// the normalized findings, and exports a report of the last scan.
#[derive(Parser)]
#[command(name = "threatscope", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the local scan cache database
    Init,

    /// Scan a single platform (twitter, reddit, youtube, gnews, newsapi, all)
    Scan {
        #[arg(long, short)]
        platform: String,

        /// Search terms (a subreddit name for reddit)
        #[arg(long, short)]
        query: Option<String>,

        /// Max items to scan (default: THREATSCOPE_LIMIT or 10)
        #[arg(long, short)]
        limit: Option<u32>,
    },

    /// Scan every platform through the aggregate endpoint
    ScanAll {
        #[arg(long, short)]
        query: Option<String>,

        #[arg(long, short)]
        limit: Option<u32>,
    },

    /// Show the cached results of the last scan
    Show,

    /// Write a markdown report of the last successful scan
    Report {
        /// Directory to write the report into
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Show system status (cache, last scan, backend health)
    Status,

    /// Refresh the dashboard summary on an interval until Ctrl-C
    Watch,

    /// Start the web dashboard
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "3000")]
        port: u16,

        /// Address to bind to (use 0.0.0.0 to listen on all interfaces)
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("threatscope=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            info!("Initializing threatscope database...");
            let storage = db::open_storage(&config.db_path)?;
            let table_count = storage.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nBackend: {}", config.api_url);
            println!("Next: threatscope scan-all");
        }

        Commands::Scan {
            platform,
            query,
            limit,
        } => {
            let (session, _) = open_session(&config)?;
            run_scan(&session, &platform, query.as_deref(), limit).await?;
        }

        Commands::ScanAll { query, limit } => {
            let (session, _) = open_session(&config)?;
            run_scan(&session, "all", query.as_deref(), limit).await?;
        }

        Commands::Show => {
            let (session, _) = open_session(&config)?;
            if !session.restore().await {
                warn!("No readable cached scan");
            }
            terminal::display_results(&session.view().await);
        }

        Commands::Report { output_dir } => {
            let (session, _) = open_session(&config)?;
            let document = session.build_report().await?;
            let path = write_report(&document, &MarkdownRenderer::default(), &output_dir)?;
            println!(
                "Report written: {} ({} threats)",
                path.display().to_string().bold(),
                document.sections.len()
            );
        }

        Commands::Status => {
            let storage = db::open_storage(&config.db_path)?;
            let backend = BackendClient::new(&config.api_url)?;
            threatscope::status::show(&storage, &backend, &config.db_path, config.stale_after)
                .await?;
        }

        Commands::Watch => {
            let client = BackendClient::new(&config.api_url)?;
            info!(api_url = client.base_url(), "Watching backend summary");
            let backend: Arc<dyn ScanBackend> = Arc::new(client);
            let poller = SummaryPoller::new(backend, config.poll_interval);
            watch(&poller, config.poll_interval).await?;
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let (session, backend) = open_session(&config)?;
            let poller = Arc::new(SummaryPoller::new(backend, config.poll_interval));
            threatscope::web::run_server(session, poller, port, &bind).await?;
        }
    }

    Ok(())
}

/// Wire up storage, backend and the session controller from config.
fn open_session(
    config: &Config,
) -> Result<(Arc<SessionController>, Arc<dyn ScanBackend>)> {
    let storage = db::open_storage(&config.db_path)?;
    let backend: Arc<dyn ScanBackend> = Arc::new(BackendClient::new(&config.api_url)?);
    let session = SessionController::new(backend.clone(), ScanCache::new(storage))
        .with_policy(config.stale_policy)
        .with_defaults(config.defaults.clone());
    Ok((Arc::new(session), backend))
}

async fn run_scan(
    session: &SessionController,
    platform: &str,
    query: Option<&str>,
    limit: Option<u32>,
) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Scanning {platform}..."));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let attempt = session.scan(platform, query, limit).await;
    spinner.finish_and_clear();

    match attempt {
        Ok(ScanAttempt::Completed(_)) => {
            terminal::display_results(&session.view().await);
            Ok(())
        }
        Ok(ScanAttempt::Ignored) => {
            println!("{}", "A scan for this platform is already running.".dimmed());
            Ok(())
        }
        Ok(ScanAttempt::Stale(_)) => {
            println!("{}", "A newer scan superseded this one.".dimmed());
            Ok(())
        }
        Err(e @ DashboardError::NetworkFailure(_)) => {
            // The view is now in its unreachable state.
            terminal::display_results(&session.view().await);
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

async fn watch(poller: &SummaryPoller, interval: Duration) -> Result<()> {
    println!(
        "{}",
        format!("Refreshing every {}s. Ctrl-C to stop.", interval.as_secs()).dimmed()
    );
    loop {
        if let Err(e) = poller.refresh_once().await {
            warn!(error = %e, "Dashboard summary refresh failed");
        }
        terminal::display_summary(&poller.snapshot().await);

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                println!();
                return Ok(());
            }
        }
    }
}
