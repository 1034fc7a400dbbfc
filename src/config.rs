use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::backend::DEFAULT_API_URL;
use crate::session::{ScanDefaults, StalePolicy};

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// setting has a default, so an empty environment is a valid one.
#[derive(Debug, Clone)]
pub struct Config {
    /// Scanning backend base URL, including its `/api` prefix.
    pub api_url: String,
    pub db_path: String,
    pub defaults: ScanDefaults,
    /// How often the summary poller refreshes.
    pub poll_interval: Duration,
    /// Age after which `status` reports the cached scan as stale.
    pub stale_after: chrono::Duration,
    pub stale_policy: StalePolicy,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let base = ScanDefaults::default();
        let defaults = ScanDefaults {
            query: env::var("THREATSCOPE_DEFAULT_QUERY").unwrap_or(base.query),
            subreddit: env::var("THREATSCOPE_DEFAULT_SUBREDDIT").unwrap_or(base.subreddit),
            limit: parse_var("THREATSCOPE_LIMIT")?.unwrap_or(base.limit),
        };
        if defaults.limit == 0 {
            anyhow::bail!("THREATSCOPE_LIMIT must be at least 1");
        }

        let poll_secs: u64 = parse_var("THREATSCOPE_POLL_SECS")?.unwrap_or(30);
        if poll_secs == 0 {
            anyhow::bail!("THREATSCOPE_POLL_SECS must be at least 1");
        }

        let stale_mins: i64 = parse_var("THREATSCOPE_STALE_AFTER_MINS")?.unwrap_or(60);
        let stale_after = stale_after_minutes(stale_mins)?;

        let stale_policy = match env::var("THREATSCOPE_FENCE_STALE").as_deref() {
            Ok("1") | Ok("true") | Ok("yes") => StalePolicy::SequenceFence,
            _ => StalePolicy::LastWriteWins,
        };

        Ok(Self {
            api_url: env::var("THREATSCOPE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            db_path: env::var("THREATSCOPE_DB_PATH")
                .unwrap_or_else(|_| "./threatscope.db".to_string()),
            defaults,
            poll_interval: Duration::from_secs(poll_secs),
            stale_after,
            stale_policy,
        })
    }
}

/// Staleness window from a minute count. Negative or out-of-range values
/// are rejected.
fn stale_after_minutes(mins: i64) -> Result<chrono::Duration> {
    if mins < 0 {
        anyhow::bail!("THREATSCOPE_STALE_AFTER_MINS must not be negative, got {mins}");
    }
    chrono::Duration::try_minutes(mins)
        .with_context(|| format!("THREATSCOPE_STALE_AFTER_MINS is out of range: {mins}"))
}

/// Parse an optional numeric env var. Unset or empty is `None`; garbage is
/// an error naming the variable.
fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} must be a number, got '{raw}'")),
        _ => Ok(None),
    }
}
