//! Keyed, per-tenant exclusive sections.
//!
//! Deciding and committing an admission is not atomic against the external
//! pool, so two requests for the same tenant must not interleave. Requests for
//! different tenants never contend: each tenant gets its own async mutex, and
//! the `parking_lot::Mutex` around the map is held only long enough to look
//! up or insert that tenant's entry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::util::serde::TenantId;

/// Map size above which idle entries are dropped on the next acquire.
const PRUNE_THRESHOLD: usize = 1024;

/// Registry of per-tenant locks.
#[derive(Debug, Default)]
pub struct TenantLocks {
    locks: Mutex<HashMap<TenantId, Arc<AsyncMutex<()>>>>,
}

/// Held exclusive section for one tenant. Dropping it lets the next request
/// for the same tenant proceed. The guard is `Send + 'static`, so it can be
/// moved into a spawned task.
#[derive(Debug)]
pub struct TenantGuard {
    tenant: TenantId,
    _guard: OwnedMutexGuard<()>,
}

impl TenantGuard {
    /// Tenant this guard serializes.
    pub fn tenant(&self) -> &str {
        &self.tenant
    }
}

impl TenantLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for and take the tenant's exclusive section.
    pub async fn acquire(&self, tenant: &str) -> TenantGuard {
        let lock = {
            let mut locks = self.locks.lock();
            if locks.len() > PRUNE_THRESHOLD {
                Self::prune_locked(&mut locks);
            }
            Arc::clone(locks.entry(tenant.to_owned()).or_default())
        };
        let guard = lock.lock_owned().await;
        tracing::trace!(tenant, "tenant lock acquired");
        TenantGuard {
            tenant: tenant.to_owned(),
            _guard: guard,
        }
    }

    /// Drop entries nobody holds or waits on. Returns how many were removed.
    pub fn prune_idle(&self) -> usize {
        let mut locks = self.locks.lock();
        Self::prune_locked(&mut locks)
    }

    /// Number of tenants with a registered lock.
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    /// Whether no tenant has a registered lock.
    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }

    // Waiters clone the Arc while holding the map lock, so a count of one
    // under the map lock means the entry is idle.
    fn prune_locked(locks: &mut HashMap<TenantId, Arc<AsyncMutex<()>>>) -> usize {
        let before = locks.len();
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - locks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_tenant_is_serialized() {
        let locks = Arc::new(TenantLocks::new());
        let guard = locks.acquire("t1").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move { locks.acquire("t1").await.tenant().to_owned() })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        assert_eq!(waiter.await.unwrap(), "t1");
    }

    #[tokio::test]
    async fn test_different_tenants_do_not_contend() {
        let locks = TenantLocks::new();
        let _a = locks.acquire("a").await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire("b")).await;
        assert!(b.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_prune_keeps_held_locks() {
        let locks = TenantLocks::new();
        let held = locks.acquire("held").await;
        drop(locks.acquire("idle").await);

        assert_eq!(locks.prune_idle(), 1);
        assert_eq!(locks.len(), 1);
        assert_eq!(held.tenant(), "held");
    }
}
