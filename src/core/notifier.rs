//! Outcome reporting contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::ExternalError;
use crate::util::serde::TenantId;

/// Reference to the upstream ticket a request originated from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestRef {
    /// Tenant the ticket belongs to.
    pub tenant: TenantId,
    /// Upstream reward/product identifier.
    pub reward_id: String,
    /// Upstream redemption identifier.
    pub redemption_id: String,
}

/// Reports outcomes to the tenant's audience and to the originating system.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post a human-readable message to the tenant's audience.
    async fn report(&self, channel: &str, message: &str) -> Result<(), ExternalError>;

    /// Mark the upstream ticket as fulfilled (`true`) or failed (`false`).
    async fn set_upstream_status(
        &self,
        request: &RequestRef,
        success: bool,
    ) -> Result<(), ExternalError>;
}
