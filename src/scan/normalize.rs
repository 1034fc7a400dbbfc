// Result normalizer: raw backend envelope + adapter -> canonical ScanResult.
//
// Nothing in here returns an error. Envelopes that say `success: false`
// become failed results, and malformed items degrade to sentinels.

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::platform::adapter::{adapter_for, Adapter};
use crate::platform::fields::{string_list, FieldChain};
use crate::platform::Platform;

use super::models::{
    ContentType, Detection, ScanResult, ServiceSummary, NO_CONTENT, UNKNOWN_AUTHOR, UNKNOWN_ERROR,
};

const ENVELOPE_TIMESTAMP: FieldChain = FieldChain::new(&["timestamp", "scan_timestamp"]);
const THREATS_FOUND: FieldChain = FieldChain::new(&["threats_found"]);

/// Normalize one backend response for `platform`.
///
/// `Platform::All` expects the aggregate envelope and delegates to
/// [`normalize_all`].
pub fn normalize(platform: Platform, raw: &Value, query: &str) -> ScanResult {
    let timestamp = envelope_timestamp(raw);
    let adapter = adapter_for(platform);

    if adapter.is_aggregate() {
        return normalize_aggregate(raw, query, timestamp);
    }

    if !raw.get("success").is_some_and(is_truthy) {
        let error = raw
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_ERROR);
        return ScanResult::failed(platform, query, timestamp, error);
    }

    let data = raw.get("data").unwrap_or(&Value::Null);

    let detections: Vec<Detection> = data
        .get(adapter.detections_field)
        .and_then(Value::as_array)
        .map(|items| items.iter().map(|item| map_detection(adapter, item)).collect())
        .unwrap_or_default();

    let items_scanned = adapter
        .items_scanned
        .first_u64(data)
        .or_else(|| adapter.items_scanned.first_u64(raw))
        .unwrap_or(0);
    let threats_found = THREATS_FOUND
        .first_u64(data)
        .unwrap_or(detections.len() as u64);

    debug!(
        platform = %platform,
        items_scanned,
        threats_found,
        detections = detections.len(),
        "Normalized scan response"
    );

    ScanResult::completed(platform, query, items_scanned, threats_found, timestamp, detections)
}

/// Merge per-service sub-envelopes into one aggregate result.
///
/// Detections are concatenated in map order; counters are summed over the
/// successful services only. Every known service, failed or not, gets a line
/// in the per-service breakdown. Keys that are not a known source platform
/// contribute nothing.
pub fn normalize_all(services: &Map<String, Value>, query: &str, timestamp: &str) -> ScanResult {
    let mut detections = Vec::new();
    let mut items_scanned = 0u64;
    let mut threats_found = 0u64;
    let mut failed = Vec::new();
    let mut breakdown = Vec::with_capacity(services.len());

    for (name, envelope) in services {
        let platform = match name.parse::<Platform>() {
            Ok(Platform::All) | Err(_) => {
                warn!(service = %name, "Skipping unrecognized service in aggregate response");
                continue;
            }
            Ok(platform) => platform,
        };

        let sub = normalize(platform, envelope, query);
        breakdown.push(ServiceSummary::from_result(&sub));
        match sub.error() {
            Some(error) => {
                failed.push(name.as_str());
                warn!(platform = %platform, error = %error, "Service failed during aggregate scan");
            }
            None => {
                items_scanned += sub.items_scanned;
                threats_found += sub.threats_found;
                detections.extend_from_slice(sub.detections());
            }
        }
    }

    if !failed.is_empty() {
        warn!(
            failed = failed.len(),
            services = services.len(),
            "Aggregate scan completed with partial failures"
        );
    }

    ScanResult::completed(
        Platform::All,
        query,
        items_scanned,
        threats_found,
        timestamp,
        detections,
    )
    .with_services(breakdown)
}

fn normalize_aggregate(raw: &Value, query: &str, timestamp: String) -> ScanResult {
    // The aggregate envelope only fails when it says so explicitly.
    if raw.get("success").is_some_and(|v| !v.is_null() && !is_truthy(v)) {
        let error = raw
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_ERROR);
        return ScanResult::failed(Platform::All, query, timestamp, error);
    }

    let empty = Map::new();
    let services = raw
        .get("services")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    normalize_all(services, query, &timestamp)
}

/// Loose truthiness for the `success` flag: `true`, non-zero numbers and
/// non-empty strings count; `null`, `false`, `0` and `""` do not. Arrays and
/// objects count as true.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn envelope_timestamp(raw: &Value) -> String {
    ENVELOPE_TIMESTAMP
        .first_str(raw)
        .or_else(|| raw.get("data").and_then(|data| ENVELOPE_TIMESTAMP.first_str(data)))
        .unwrap_or_else(|| Utc::now().to_rfc3339())
}

/// Map one raw item. Non-object items read as empty objects, so they still
/// produce a (sentinel-filled) detection and keep the list length intact.
fn map_detection(adapter: &Adapter, item: &Value) -> Detection {
    let rules = &adapter.rules;

    let content_type = match item.get(rules.content_type).and_then(Value::as_str) {
        Some(raw) if !raw.trim().is_empty() => ContentType::from_raw(raw),
        _ => adapter.default_type,
    };

    Detection {
        author: rules
            .author
            .first_str(item)
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        content_type,
        confidence: item.get("confidence").and_then(Value::as_f64),
        body: rules
            .body
            .first_str(item)
            .unwrap_or_else(|| NO_CONTENT.to_string()),
        timestamp: rules.timestamp.first_str(item),
        keywords: string_list(item, rules.keywords),
        source_url: rules.url.first_str(item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_success_is_failure() {
        let result = normalize(Platform::Twitter, &json!({"data": {"detections": []}}), "q");
        assert!(!result.success());
        assert_eq!(result.error(), Some(UNKNOWN_ERROR));
    }

    #[test]
    fn test_success_flag_truthiness() {
        for flag in [json!(1), json!("true"), json!("yes"), json!(true)] {
            let raw = json!({"success": flag, "data": {"detections": []}});
            assert!(normalize(Platform::Reddit, &raw, "q").success(), "{flag}");
        }
        for flag in [json!(0), json!(""), json!(false), json!(null)] {
            let raw = json!({"success": flag, "data": {"detections": []}});
            assert!(!normalize(Platform::Reddit, &raw, "q").success(), "{flag}");
        }
    }

    #[test]
    fn test_backend_timestamp_is_kept() {
        let raw = json!({"success": true, "timestamp": "2024-03-01T10:00:00", "data": {}});
        let result = normalize(Platform::Gnews, &raw, "q");
        assert_eq!(result.timestamp, "2024-03-01T10:00:00");
    }

    #[test]
    fn test_client_stamps_when_backend_omits_timestamp() {
        let result = normalize(Platform::Gnews, &json!({"success": true, "data": {}}), "q");
        assert!(chrono::DateTime::parse_from_rfc3339(&result.timestamp).is_ok());
    }

    #[test]
    fn test_blank_type_uses_platform_default() {
        let raw = json!({"success": true, "data": {"detections": [{"type": " "}]}});
        let result = normalize(Platform::Youtube, &raw, "q");
        assert_eq!(result.detections()[0].content_type, ContentType::Video);
    }
}
