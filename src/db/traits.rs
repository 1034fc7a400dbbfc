// Storage trait: the durable key/value surface the scan cache sits on.
//
// Implementors: SqliteStorage (wraps rusqlite) and MemoryStorage. Methods are
// async so the sync rusqlite connection (behind a Mutex) and a plain
// in-process map fit behind one interface.

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Count the number of user-created tables (0 for non-SQL backends).
    async fn table_count(&self) -> Result<i64>;

    /// Get a scan state value by key (e.g. "threatScanResults").
    async fn get_scan_state(&self, key: &str) -> Result<Option<String>>;

    /// Set a scan state value (upsert).
    async fn set_scan_state(&self, key: &str, value: &str) -> Result<()>;

    /// Upsert several values at once. Either every entry lands or none does.
    async fn set_scan_states(&self, entries: &[(&str, &str)]) -> Result<()>;

    /// All scan state rows, ordered by key.
    async fn get_all_scan_state(&self) -> Result<Vec<(String, String)>>;
}
