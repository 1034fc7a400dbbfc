// Platform adapter table. Static and data-only.
//
// Each adapter says which backend endpoint to hit, how to shape the query
// string, and which raw field names feed each canonical Detection attribute.
// There is no behavior here beyond lookup and parameter building.

use crate::error::DashboardError;
use crate::scan::models::ContentType;

use super::fields::FieldChain;
use super::Platform;

/// The "items scanned" counter names, in the order they are consulted.
///
/// Only one is ever populated per platform, but the order is fixed for every
/// adapter so two payloads that both carry counters resolve the same way.
pub const ITEMS_SCANNED: FieldChain = FieldChain::new(&[
    "posts_scanned",
    "tweets_scanned",
    "videos_scanned",
    "articles_scanned",
]);

const TIMESTAMP: FieldChain = FieldChain::new(&["created_at", "created_utc", "published_at"]);

/// How a platform's free-text input maps onto its query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamShape {
    /// `query=<text>&limit=<n>`
    Query,
    /// `subreddit=<community>&limit=<n>`
    Community,
}

/// Raw field names for each canonical Detection attribute.
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub author: FieldChain,
    pub body: FieldChain,
    pub timestamp: FieldChain,
    pub url: FieldChain,
    pub content_type: &'static str,
    pub keywords: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct Adapter {
    pub platform: Platform,
    /// Path under the backend's API base URL.
    pub endpoint: &'static str,
    pub param_shape: ParamShape,
    pub items_scanned: FieldChain,
    /// Name of the detection array inside the envelope's `data` object.
    pub detections_field: &'static str,
    /// Content type used when a raw item carries no `type` field.
    pub default_type: ContentType,
    pub rules: FieldRules,
}

impl Adapter {
    /// Build the ordered query-string pairs for a scan request.
    pub fn build_params(&self, query: &str, limit: u32) -> Vec<(&'static str, String)> {
        let key = match self.param_shape {
            ParamShape::Query => "query",
            ParamShape::Community => "subreddit",
        };
        vec![(key, query.to_string()), ("limit", limit.to_string())]
    }

    pub fn is_aggregate(&self) -> bool {
        self.platform == Platform::All
    }
}

static ADAPTERS: [Adapter; 6] = [
    Adapter {
        platform: Platform::Twitter,
        endpoint: "/twitter/scan",
        param_shape: ParamShape::Query,
        items_scanned: ITEMS_SCANNED,
        detections_field: "detections",
        default_type: ContentType::Post,
        rules: FieldRules {
            author: FieldChain::new(&["author", "username"]),
            body: FieldChain::new(&["content", "text_preview", "title"]),
            timestamp: TIMESTAMP,
            url: FieldChain::new(&["url", "post_url", "tweet_url", "video_url"]),
            content_type: "type",
            keywords: "keywords_found",
        },
    },
    Adapter {
        platform: Platform::Reddit,
        endpoint: "/reddit/scan",
        param_shape: ParamShape::Community,
        items_scanned: ITEMS_SCANNED,
        detections_field: "detections",
        default_type: ContentType::Post,
        rules: FieldRules {
            author: FieldChain::new(&["author", "username"]),
            body: FieldChain::new(&["content", "text_preview", "title"]),
            timestamp: TIMESTAMP,
            url: FieldChain::new(&["url", "post_url", "tweet_url", "video_url", "comment_url"]),
            content_type: "type",
            keywords: "keywords_found",
        },
    },
    Adapter {
        platform: Platform::Youtube,
        endpoint: "/youtube/scan",
        param_shape: ParamShape::Query,
        items_scanned: ITEMS_SCANNED,
        detections_field: "detections",
        default_type: ContentType::Video,
        rules: FieldRules {
            author: FieldChain::new(&["author", "username", "channel_title"]),
            body: FieldChain::new(&["content", "comment_text", "text_preview", "title"]),
            timestamp: TIMESTAMP,
            url: FieldChain::new(&["url", "post_url", "tweet_url", "video_url"]),
            content_type: "type",
            keywords: "keywords_found",
        },
    },
    Adapter {
        platform: Platform::Gnews,
        endpoint: "/gnews/scan",
        param_shape: ParamShape::Query,
        items_scanned: ITEMS_SCANNED,
        detections_field: "detections",
        default_type: ContentType::Article,
        rules: FieldRules {
            author: FieldChain::new(&["author", "username", "source_name"]),
            body: FieldChain::new(&["content", "content_preview", "text_preview", "title"]),
            timestamp: TIMESTAMP,
            url: FieldChain::new(&["url", "post_url", "tweet_url", "video_url"]),
            content_type: "type",
            keywords: "keywords_found",
        },
    },
    Adapter {
        platform: Platform::Newsapi,
        endpoint: "/newsapi/scan",
        param_shape: ParamShape::Query,
        items_scanned: ITEMS_SCANNED,
        detections_field: "detections",
        default_type: ContentType::Article,
        rules: FieldRules {
            author: FieldChain::new(&["author", "username", "source_name"]),
            body: FieldChain::new(&["content", "content_preview", "text_preview", "title"]),
            timestamp: TIMESTAMP,
            url: FieldChain::new(&["url", "post_url", "tweet_url", "video_url"]),
            content_type: "type",
            keywords: "keywords_found",
        },
    },
    // The aggregate endpoint returns per-service sub-envelopes; its own
    // field rules are never consulted for items.
    Adapter {
        platform: Platform::All,
        endpoint: "/scan/all",
        param_shape: ParamShape::Query,
        items_scanned: ITEMS_SCANNED,
        detections_field: "detections",
        default_type: ContentType::Generic,
        rules: FieldRules {
            author: FieldChain::new(&["author", "username"]),
            body: FieldChain::new(&["content", "text_preview", "title"]),
            timestamp: TIMESTAMP,
            url: FieldChain::new(&["url", "post_url", "tweet_url", "video_url"]),
            content_type: "type",
            keywords: "keywords_found",
        },
    },
];

/// Backend health endpoint (not an adapter: it carries no scan results).
pub const HEALTH_ENDPOINT: &str = "/health";

/// Look up the adapter for a known platform.
pub fn adapter_for(platform: Platform) -> &'static Adapter {
    let index = match platform {
        Platform::Twitter => 0,
        Platform::Reddit => 1,
        Platform::Youtube => 2,
        Platform::Gnews => 3,
        Platform::Newsapi => 4,
        Platform::All => 5,
    };
    &ADAPTERS[index]
}

/// Resolve a platform identifier to its adapter.
///
/// Fails with `UnknownPlatform` for anything outside the closed set; callers
/// must do this before any network I/O.
pub fn resolve(name: &str) -> Result<&'static Adapter, DashboardError> {
    let platform: Platform = name.parse()?;
    Ok(adapter_for(platform))
}
