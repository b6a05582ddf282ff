//! In-memory stand-in for the external resource service.
//!
//! Enforces capacity and id uniqueness the way the real service does, and
//! lets tests inject failures and latency per call kind.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::{ExternalError, ExternalPhase, PoolSnapshot, ResourceClient};
use crate::util::serde::{Item, ItemId, TenantId};

#[derive(Debug, Default)]
struct PoolState {
    capacity: u32,
    items: Vec<Item>,
}

#[derive(Debug, Default)]
struct Faults {
    fail_next: HashMap<ExternalPhase, ExternalError>,
    delays: HashMap<ExternalPhase, Duration>,
    calls: HashMap<ExternalPhase, usize>,
}

/// Resource service held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryResourceClient {
    catalog: Mutex<HashMap<ItemId, Item>>,
    pools: Mutex<HashMap<TenantId, PoolState>>,
    faults: Mutex<Faults>,
}

impl InMemoryResourceClient {
    /// Create an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make an item resolvable through `fetch_item`.
    pub fn add_catalog_item(&self, item: Item) {
        self.catalog.lock().insert(item.id.clone(), item);
    }

    /// Create or replace a tenant's pool. The items are added to the catalog.
    pub fn set_pool(&self, tenant: &str, capacity: u32, items: Vec<Item>) {
        {
            let mut catalog = self.catalog.lock();
            for item in &items {
                catalog.insert(item.id.clone(), item.clone());
            }
        }
        self.pools
            .lock()
            .insert(tenant.to_owned(), PoolState { capacity, items });
    }

    /// Items currently installed for a tenant.
    pub fn pool_items(&self, tenant: &str) -> Vec<Item> {
        self.pools
            .lock()
            .get(tenant)
            .map(|pool| pool.items.clone())
            .unwrap_or_default()
    }

    /// Make the next call of `phase` fail with `err` without side effects.
    pub fn fail_next(&self, phase: ExternalPhase, err: ExternalError) {
        self.faults.lock().fail_next.insert(phase, err);
    }

    /// Delay every call of `phase` before it takes effect.
    pub fn delay(&self, phase: ExternalPhase, delay: Duration) {
        self.faults.lock().delays.insert(phase, delay);
    }

    /// Number of calls made for `phase`, including failed ones.
    pub fn calls(&self, phase: ExternalPhase) -> usize {
        self.faults.lock().calls.get(&phase).copied().unwrap_or(0)
    }

    /// Count the call, then apply the configured delay and fault.
    async fn enter(&self, phase: ExternalPhase) -> Result<(), ExternalError> {
        let (delay, fault) = {
            let mut faults = self.faults.lock();
            *faults.calls.entry(phase).or_default() += 1;
            (
                faults.delays.get(&phase).copied(),
                faults.fail_next.remove(&phase),
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        fault.map_or(Ok(()), Err)
    }
}

#[async_trait]
impl ResourceClient for InMemoryResourceClient {
    async fn fetch_pool(&self, tenant: &str) -> Result<PoolSnapshot, ExternalError> {
        self.enter(ExternalPhase::Fetch).await?;
        let pools = self.pools.lock();
        let pool = pools
            .get(tenant)
            .ok_or_else(|| ExternalError::NotFound(format!("tenant {tenant}")))?;
        Ok(PoolSnapshot {
            tenant: tenant.to_owned(),
            capacity: pool.capacity,
            items: pool.items.clone(),
        })
    }

    async fn fetch_item(&self, item_id: &str) -> Result<Item, ExternalError> {
        self.enter(ExternalPhase::Fetch).await?;
        self.catalog
            .lock()
            .get(item_id)
            .cloned()
            .ok_or_else(|| ExternalError::NotFound(format!("item {item_id}")))
    }

    async fn evict(&self, tenant: &str, item_id: &str) -> Result<(), ExternalError> {
        self.enter(ExternalPhase::Evict).await?;
        let mut pools = self.pools.lock();
        let pool = pools
            .get_mut(tenant)
            .ok_or_else(|| ExternalError::NotFound(format!("tenant {tenant}")))?;
        let position = pool
            .items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or_else(|| ExternalError::NotFound(format!("item {item_id} in {tenant}")))?;
        pool.items.remove(position);
        Ok(())
    }

    async fn install(&self, tenant: &str, item_id: &str) -> Result<(), ExternalError> {
        self.enter(ExternalPhase::Install).await?;
        let item = self
            .catalog
            .lock()
            .get(item_id)
            .cloned()
            .ok_or_else(|| ExternalError::NotFound(format!("item {item_id}")))?;
        let mut pools = self.pools.lock();
        let pool = pools
            .get_mut(tenant)
            .ok_or_else(|| ExternalError::NotFound(format!("tenant {tenant}")))?;
        if pool.items.len() >= pool.capacity as usize {
            return Err(ExternalError::CapacityExceeded);
        }
        if pool.items.iter().any(|installed| installed.id == item.id) {
            return Err(ExternalError::Request(format!("{item_id} already installed")));
        }
        pool.items.push(item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_install_enforces_capacity() {
        let client = InMemoryResourceClient::new();
        client.set_pool("t", 1, vec![Item::new("a", "A")]);
        client.add_catalog_item(Item::new("b", "B"));

        let err = client.install("t", "b").await.unwrap_err();
        assert_eq!(err, ExternalError::CapacityExceeded);

        client.evict("t", "a").await.unwrap();
        client.install("t", "b").await.unwrap();
        assert_eq!(client.pool_items("t"), vec![Item::new("b", "B")]);
    }

    #[tokio::test]
    async fn test_injected_fault_fires_once() {
        let client = InMemoryResourceClient::new();
        client.set_pool("t", 2, vec![Item::new("a", "A")]);
        client.fail_next(ExternalPhase::Evict, ExternalError::Request("boom".into()));

        assert!(client.evict("t", "a").await.is_err());
        assert_eq!(client.pool_items("t").len(), 1);
        client.evict("t", "a").await.unwrap();
        assert_eq!(client.calls(ExternalPhase::Evict), 2);
    }

    #[tokio::test]
    async fn test_unknown_item_not_found() {
        let client = InMemoryResourceClient::new();
        let err = client.fetch_item("nope").await.unwrap_err();
        assert!(matches!(err, ExternalError::NotFound(_)));
    }
}
