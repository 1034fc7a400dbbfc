// Storage layer: the durable home of the scan cache's two slots.
//
// rusqlite with the "bundled" feature, so there's no system SQLite
// dependency. The database file lives wherever THREATSCOPE_DB_PATH points
// (defaults to ./threatscope.db). Builds without the `sqlite` feature fall
// back to MemoryStorage.

pub mod memory;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod queries;
#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use std::sync::Arc;

use anyhow::Result;

pub use memory::MemoryStorage;
pub use traits::Storage;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStorage;

/// Open (or create) the database and run migrations.
///
/// Called by `threatscope init` and by any command that needs storage.
#[cfg(feature = "sqlite")]
pub fn initialize(db_path: &str) -> Result<rusqlite::Connection> {
    use anyhow::Context;
    use std::path::Path;

    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for database: {}", db_path))?;
        }
    }

    let conn = rusqlite::Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    schema::create_tables(&conn)?;

    Ok(conn)
}

/// Open the configured storage backend behind `Arc<dyn Storage>`.
pub fn open_storage(db_path: &str) -> Result<Arc<dyn Storage>> {
    #[cfg(feature = "sqlite")]
    {
        let conn = initialize(db_path)?;
        Ok(Arc::new(SqliteStorage::new(conn)))
    }

    #[cfg(not(feature = "sqlite"))]
    {
        tracing::warn!(
            db_path = db_path,
            "Built without the sqlite feature; scan cache will not persist"
        );
        Ok(Arc::new(MemoryStorage::new()))
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_storage_persists_across_reopen() {
        let dir = std::env::temp_dir().join(format!("threatscope-db-{}", std::process::id()));
        let path = dir.join("test.db");
        let path = path.to_str().unwrap();

        let storage = open_storage(path).unwrap();
        storage.set_scan_state("scanTimestamp", "t1").await.unwrap();
        drop(storage);

        let storage = open_storage(path).unwrap();
        assert_eq!(
            storage.get_scan_state("scanTimestamp").await.unwrap(),
            Some("t1".to_string())
        );

        std::fs::remove_dir_all(&dir).ok();
    }
}
