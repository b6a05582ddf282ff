//! External resource service contract and pool snapshots.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::ExternalError;
use crate::util::serde::{Item, TenantId};

/// Pool contents as reported by the external service at one point in time.
///
/// Snapshots are fetched for every decision and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// Owning tenant.
    pub tenant: TenantId,
    /// Number of slots the external service grants this tenant.
    pub capacity: u32,
    /// Items currently installed, in the order the service reports them.
    pub items: Vec<Item>,
}

impl PoolSnapshot {
    /// Whether no free slot remains. A pool holding more items than its
    /// capacity also counts as full.
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity as usize
    }

    /// Find an installed item by id.
    pub fn find(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Find an installed item by display name.
    pub fn find_by_name(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Names that appear more than once. The external service is expected
    /// to keep names unique, so a non-empty result means it did not.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut duplicates = Vec::new();
        for item in &self.items {
            if !seen.insert(item.name.as_str()) && !duplicates.contains(&item.name.as_str()) {
                duplicates.push(item.name.as_str());
            }
        }
        duplicates
    }
}

/// Authoritative pool owner. Every call is an independent network operation;
/// nothing is atomic across calls.
///
/// `evict` is not guaranteed idempotent by implementors, so callers issue it
/// at most once per logical eviction.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Read the tenant's current capacity and items.
    async fn fetch_pool(&self, tenant: &str) -> Result<PoolSnapshot, ExternalError>;

    /// Resolve catalog metadata for an item. Fails with
    /// [`ExternalError::NotFound`] for unknown ids.
    async fn fetch_item(&self, item_id: &str) -> Result<Item, ExternalError>;

    /// Remove an item from the tenant's pool.
    async fn evict(&self, tenant: &str, item_id: &str) -> Result<(), ExternalError>;

    /// Add an item to the tenant's pool.
    async fn install(&self, tenant: &str, item_id: &str) -> Result<(), ExternalError>;
}
