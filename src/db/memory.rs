// MemoryStorage: in-process Storage for tests and sqlite-less builds.
// Nothing survives the process.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::traits::Storage;

#[derive(Default)]
pub struct MemoryStorage {
    state: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn table_count(&self) -> Result<i64> {
        Ok(0)
    }

    async fn get_scan_state(&self, key: &str) -> Result<Option<String>> {
        Ok(self.state.read().await.get(key).cloned())
    }

    async fn set_scan_state(&self, key: &str, value: &str) -> Result<()> {
        self.state
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_scan_states(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut state = self.state.write().await;
        for (key, value) in entries {
            state.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    async fn get_all_scan_state(&self) -> Result<Vec<(String, String)>> {
        Ok(self
            .state
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
