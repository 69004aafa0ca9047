use crate::protocol::Product;
use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;

/// Durable save-data storage, keyed by player id.
///
/// The backend's invocation ends the moment its response is produced, so
/// `save` must be awaited inside the turn; it cannot be fire-and-forget.
#[async_trait::async_trait]
pub trait PersistenceStore: Send + Sync {
    async fn load(&self, player_id: &str) -> Result<Option<Value>>;
    async fn save(&self, player_id: &str, data: &Value) -> Result<()>;
}

/// Commerce catalog collaborator.
///
/// May fail independently of the turn; callers substitute an empty catalog.
#[async_trait::async_trait]
pub trait EntitlementStore: Send + Sync {
    async fn get_entitlements(&self, locale: &str) -> Result<Vec<Product>>;
}

/// In-memory persistence for tests and local runs.
pub struct MemoryPersistence {
    records: RwLock<HashMap<String, Value>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryPersistence {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PersistenceStore for MemoryPersistence {
    async fn load(&self, player_id: &str) -> Result<Option<Value>> {
        let records = self.records.read().await;
        Ok(records.get(player_id).cloned())
    }

    async fn save(&self, player_id: &str, data: &Value) -> Result<()> {
        info!("Saving player data for {}", player_id);
        let mut records = self.records.write().await;
        records.insert(player_id.to_string(), data.clone());
        Ok(())
    }
}

/// Fixed catalog for tests and local runs.
#[derive(Default)]
pub struct StaticCatalog {
    products: Vec<Product>,
}

impl StaticCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }
}

#[async_trait::async_trait]
impl EntitlementStore for StaticCatalog {
    async fn get_entitlements(&self, _locale: &str) -> Result<Vec<Product>> {
        Ok(self.products.clone())
    }
}
