// Scan state queries. All SQL lives here; callers get plain Rust functions.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

/// Get a scan state value by key.
pub fn get_scan_state(conn: &Connection, key: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT value FROM scan_state WHERE key = ?1")?;
    let result = stmt.query_row(params![key], |row| row.get(0)).optional()?;
    Ok(result)
}

/// Set a scan state value (upsert).
pub fn set_scan_state(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO scan_state (key, value, updated_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
        params![key, value],
    )?;
    Ok(())
}

/// Upsert several values in one transaction.
pub fn set_scan_states(conn: &mut Connection, entries: &[(&str, &str)]) -> Result<()> {
    let tx = conn.transaction()?;
    for (key, value) in entries {
        set_scan_state(&tx, key, value)?;
    }
    tx.commit()?;
    Ok(())
}

/// All scan state rows, ordered by key.
pub fn get_all_scan_state(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare("SELECT key, value FROM scan_state ORDER BY key")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}
