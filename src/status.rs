// System status: storage, cached scan and backend health.

use std::sync::Arc;

use anyhow::Result;
use chrono::Duration;
use colored::Colorize;

use crate::backend::ScanBackend;
use crate::cache::ScanCache;
use crate::db::Storage;

/// Display system status to the terminal.
pub async fn show(
    storage: &Arc<dyn Storage>,
    backend: &dyn ScanBackend,
    db_display_path: &str,
    stale_after: Duration,
) -> Result<()> {
    let file_size = std::fs::metadata(db_display_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "in memory".to_string());
    println!(
        "Database: {} ({}, {} tables)",
        db_display_path,
        file_size,
        storage.table_count().await?
    );

    let slots = storage.get_all_scan_state().await?;
    if slots.is_empty() {
        println!("Cache slots: none");
    } else {
        println!("Cache slots: {}", describe_slots(&slots).join(", "));
    }

    let cache = ScanCache::new(storage.clone());
    match (cache.read().await, cache.captured_at().await) {
        (Some(result), captured_at) => {
            let age = captured_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "unknown".to_string());
            let freshness = if cache.is_stale(stale_after).await {
                "stale".yellow()
            } else {
                "fresh".green()
            };
            println!(
                "Last scan: {} \"{}\" captured {} ({})",
                result.platform, result.query, age, freshness
            );
            match result.error() {
                Some(error) => println!("  failed: {error}"),
                None => println!(
                    "  {} threats in {} items ({}%)",
                    result.threats_found,
                    result.items_scanned,
                    result.detection_rate()
                ),
            }
        }
        (None, _) => {
            println!("Last scan: never");
            println!("  Run `threatscope scan-all` to run one");
        }
    }

    match backend.health().await {
        Ok(health) => println!(
            "Backend: {} ({}/{} services available)",
            health.status,
            health.available_count(),
            health.services.len()
        ),
        Err(e) => println!("Backend: {} ({})", "unreachable".red(), e),
    }

    Ok(())
}

/// `key (size)` for each stored scan state row, in key order.
fn describe_slots(rows: &[(String, String)]) -> Vec<String> {
    rows.iter()
        .map(|(key, value)| format!("{} ({})", key, format_bytes(value.len() as u64)))
        .collect()
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[tokio::test]
    async fn test_describe_slots_after_cache_write() {
        use crate::db::MemoryStorage;
        use crate::platform::Platform;
        use crate::scan::ScanResult;

        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let cache = ScanCache::new(storage.clone());
        cache
            .write(&ScanResult::completed(Platform::Reddit, "q", 1, 0, "t", vec![]))
            .await
            .unwrap();

        let rows = storage.get_all_scan_state().await.unwrap();
        let slots = describe_slots(&rows);
        assert_eq!(slots.len(), 2);
        assert!(slots[0].starts_with("scanTimestamp ("));
        assert!(slots[1].starts_with("threatScanResults ("));
        assert!(slots[1].ends_with(" B)"));
    }
}
