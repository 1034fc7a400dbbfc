// Platforms: the closed set of scan sources and their adapter table.

pub mod adapter;
pub mod fields;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// A scan source, or `All` for the backend's aggregate endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Reddit,
    Youtube,
    Gnews,
    Newsapi,
    All,
}

impl Platform {
    /// The five single-source platforms, in the order the backend scans them.
    pub const SOURCES: [Platform; 5] = [
        Platform::Reddit,
        Platform::Twitter,
        Platform::Youtube,
        Platform::Gnews,
        Platform::Newsapi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Reddit => "reddit",
            Platform::Youtube => "youtube",
            Platform::Gnews => "gnews",
            Platform::Newsapi => "newsapi",
            Platform::All => "all",
        }
    }

    /// Human-facing name used in report titles and headings.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Twitter => "Twitter",
            Platform::Reddit => "Reddit",
            Platform::Youtube => "YouTube",
            Platform::Gnews => "GNews",
            Platform::Newsapi => "NewsAPI",
            Platform::All => "All Platforms",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "twitter" => Ok(Platform::Twitter),
            "reddit" => Ok(Platform::Reddit),
            "youtube" => Ok(Platform::Youtube),
            "gnews" => Ok(Platform::Gnews),
            "newsapi" => Ok(Platform::Newsapi),
            "all" => Ok(Platform::All),
            _ => Err(DashboardError::UnknownPlatform(s.to_string())),
        }
    }
}
