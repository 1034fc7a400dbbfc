// Shared test fixtures: a scriptable ScanBackend and realistic payloads.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;

use threatscope::backend::ScanBackend;
use threatscope::cache::ScanCache;
use threatscope::db::{MemoryStorage, Storage};
use threatscope::error::DashboardError;
use threatscope::session::SessionController;

pub type Params = Vec<(&'static str, String)>;

/// Scripted backend. Responses are queued per endpoint; an endpoint with an
/// empty queue answers with an empty successful envelope. A gated endpoint
/// blocks until its gate is released.
#[derive(Default)]
pub struct MockBackend {
    responses: Mutex<HashMap<String, VecDeque<Result<Value, DashboardError>>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<(String, Params)>>,
    call_count: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, endpoint: &str, response: Value) {
        self.push(endpoint, Ok(response));
    }

    pub fn fail(&self, endpoint: &str, message: &str) {
        self.push(
            endpoint,
            Err(DashboardError::NetworkFailure(message.to_string())),
        );
    }

    /// Hold requests to `endpoint` until the returned Notify is signalled.
    pub fn gate(&self, endpoint: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), notify.clone());
        notify
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<(String, Params)> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, endpoint: &str, response: Result<Value, DashboardError>) {
        self.responses
            .lock()
            .unwrap()
            .entry(endpoint.to_string())
            .or_default()
            .push_back(response);
    }
}

#[async_trait]
impl ScanBackend for MockBackend {
    async fn fetch(
        &self,
        endpoint: &str,
        params: &[(&'static str, String)],
    ) -> Result<Value, DashboardError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.to_string(), params.to_vec()));

        let gate = self.gates.lock().unwrap().get(endpoint).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let next = self
            .responses
            .lock()
            .unwrap()
            .get_mut(endpoint)
            .and_then(VecDeque::pop_front);
        next.unwrap_or_else(|| Ok(json!({"success": true, "data": {"detections": []}})))
    }
}

/// A controller over the mock and an in-memory cache.
pub fn session_with(backend: Arc<MockBackend>) -> (SessionController, Arc<dyn Storage>) {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let session = SessionController::new(backend, ScanCache::new(storage.clone()));
    (session, storage)
}

// ---- payloads shaped like the backend's per-platform services ----

pub fn reddit_payload() -> Value {
    json!({
        "success": true,
        "timestamp": "2024-03-01T10:00:00",
        "data": {
            "posts_scanned": 25,
            "threats_found": 2,
            "detections": [
                {
                    "type": "post",
                    "title": "Title only fallback",
                    "author": "throwaway123",
                    "content": "You should be scared to post here",
                    "post_url": "https://reddit.com/r/x/comments/1",
                    "confidence": 0.92,
                    "keywords_found": ["scared", "threat"],
                    "created_utc": "2024-03-01T09:00:00"
                },
                {
                    "type": "comment",
                    "author": "[deleted]",
                    "content": "nobody wants you here",
                    "comment_url": "https://reddit.com/r/x/comments/1/c/2",
                    "confidence": 0.55,
                    "keywords_found": [],
                    "created_utc": "2024-03-01T09:30:00"
                }
            ]
        }
    })
}

pub fn youtube_payload() -> Value {
    json!({
        "success": true,
        "data": {
            "videos_scanned": 8,
            "threats_found": 2,
            "detections": [
                {
                    "type": "video",
                    "title": "Video title as body",
                    "channel_title": "SomeChannel",
                    "video_url": "https://www.youtube.com/watch?v=abc",
                    "published_at": "2024-02-28T12:00:00Z",
                    "confidence": 0.81,
                    "keywords_found": ["abuse"]
                },
                {
                    "type": "comment",
                    "comment_text": "I know where you live",
                    "author": "Commenter",
                    "video_url": "https://www.youtube.com/watch?v=abc",
                    "published_at": "2024-02-28T13:00:00Z",
                    "confidence": 0.4,
                    "keywords_found": ["know where you live"]
                }
            ]
        }
    })
}

pub fn gnews_payload() -> Value {
    json!({
        "success": true,
        "data": {
            "articles_scanned": 10,
            "threats_found": 1,
            "detections": [
                {
                    "type": "news_article",
                    "title": "Headline",
                    "url": "https://news.example/a",
                    "source_name": "Example News",
                    "author": "GNews Source",
                    "published_at": "2024-03-01T08:00:00Z",
                    "confidence": 0.66,
                    "keywords_found": ["harassment"],
                    "content_preview": "Report on online harassment"
                }
            ]
        }
    })
}

pub fn twitter_payload() -> Value {
    json!({
        "success": true,
        "data": {
            "tweets_scanned": 20,
            "threats_found": 1,
            "detections": [
                {
                    "type": "tweet",
                    "username": "troll_account",
                    "text_preview": "watch your back",
                    "tweet_url": "https://x.com/troll_account/status/1",
                    "created_at": "2024-03-01T07:00:00Z",
                    "confidence": 0.97,
                    "keywords_found": ["watch your back"]
                }
            ]
        }
    })
}

pub fn aggregate_payload() -> Value {
    json!({
        "scan_timestamp": "2024-03-01T10:05:00",
        "total_threats_found": 3,
        "services_scanned": 2,
        "services": {
            "reddit": reddit_payload(),
            "twitter": {"success": false, "error": "Twitter API quota exceeded"},
            "youtube": youtube_payload()
        }
    })
}

pub fn health_payload() -> Value {
    json!({
        "status": "healthy",
        "services": {
            "reddit": "available",
            "twitter": "unavailable",
            "youtube": "available",
            "gnews": "error",
            "newsapi": "available"
        }
    })
}
