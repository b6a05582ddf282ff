//! Admission decisions and the two-phase evict-then-install commit.
//!
//! [`AdmissionEngine::decide`] reads the blocklist, the external pool and the
//! ledger window and returns a [`Decision`] without mutating anything. The
//! eviction choice itself is [`plan_admission`], a pure function over those
//! inputs. [`AdmissionEngine::commit`] then evicts (if needed) and installs,
//! writing one ledger entry per external mutation that succeeded.
//!
//! Neither operation retries. Callers serialize both per tenant.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::core::ledger::{build_entry, Blocklist, Ledger, LedgerEntry};
use crate::core::random::{RandomSource, ThreadRandom};
use crate::core::resource::{PoolSnapshot, ResourceClient};
use crate::core::{AdmissionError, ExternalError, ExternalPhase, LedgerError};
use crate::util::serde::{ChangeKind, Item, ItemId, TenantId};

/// A request to install one item into a tenant's pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionRequest {
    /// Tenant whose pool is targeted.
    pub tenant: TenantId,
    /// Item to install.
    pub item_id: ItemId,
    /// Display name of the requester.
    pub requested_by: String,
    /// How many recent `Add` entries are eviction candidates.
    pub slots: u32,
}

impl AdmissionRequest {
    /// Build a request.
    pub fn new(
        tenant: impl Into<TenantId>,
        item_id: impl Into<ItemId>,
        requested_by: impl Into<String>,
        slots: u32,
    ) -> Self {
        Self {
            tenant: tenant.into(),
            item_id: item_id.into(),
            requested_by: requested_by.into(),
            slots,
        }
    }
}

/// Why a request was turned down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    /// Requested item is on the tenant's blocklist.
    Blocked {
        /// Blocked item.
        item_id: ItemId,
    },
    /// An item with the same name is already installed.
    Duplicate {
        /// Colliding name.
        name: String,
    },
}

impl From<Rejection> for AdmissionError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Blocked { item_id } => Self::ItemBlocked { item_id },
            Rejection::Duplicate { name } => Self::DuplicateItem { name },
        }
    }
}

/// An accepted request and what has to make room for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admission {
    /// Item to install, with canonical metadata.
    pub item: Item,
    /// Installed item to evict first, as seen in the decision's snapshot.
    pub eviction: Option<Item>,
    /// `Add` without eviction, otherwise how the target was chosen.
    pub change: ChangeKind,
}

/// Outcome of [`AdmissionEngine::decide`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// Request may proceed to commit.
    Admit(Admission),
    /// Request must not touch the pool.
    Reject(Rejection),
}

impl Decision {
    /// Whether the request was admitted.
    pub const fn is_admit(&self) -> bool {
        matches!(self, Self::Admit(_))
    }

    /// Item that commit will evict, if any.
    pub const fn eviction_target(&self) -> Option<&Item> {
        match self {
            Self::Admit(admission) => admission.eviction.as_ref(),
            Self::Reject(_) => None,
        }
    }

    /// Classification of an admitted request.
    pub const fn change(&self) -> Option<ChangeKind> {
        match self {
            Self::Admit(admission) => Some(admission.change),
            Self::Reject(_) => None,
        }
    }

    /// Unwrap the admission, turning a rejection into its typed error.
    pub fn into_admission(self) -> Result<Admission, AdmissionError> {
        match self {
            Self::Admit(admission) => Ok(admission),
            Self::Reject(rejection) => Err(rejection.into()),
        }
    }
}

/// What a successful commit changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitOutcome {
    /// Item now installed.
    pub installed: Item,
    /// Item removed to make room.
    pub evicted: Option<Item>,
    /// Classification recorded for the eviction, or `Add`.
    pub change: ChangeKind,
}

/// Lifecycle of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    /// Accepted from the transport.
    Received,
    /// Decision computed.
    Decided,
    /// Eviction call in flight.
    Evicting,
    /// Eviction done and recorded.
    Evicted,
    /// Install call in flight.
    Installing,
    /// Install done and recorded.
    Installed,
    /// Turned down before any mutation.
    Rejected,
    /// Failed; the pool may have lost an item if an eviction went through.
    Failed,
}

impl RequestState {
    /// Whether no further transition follows.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Installed | Self::Rejected | Self::Failed)
    }

    /// Terminal state for a finished request.
    pub fn from_result<T>(result: &Result<T, AdmissionError>) -> Self {
        match result {
            Ok(_) => Self::Installed,
            Err(err) if err.is_rejection() => Self::Rejected,
            Err(AdmissionError::InvalidRequest(_)) => Self::Rejected,
            Err(_) => Self::Failed,
        }
    }
}

/// Choose what, if anything, to evict so `item` fits.
///
/// `window` holds the tenant's most recent `Add` entries, newest first, with
/// `blocked` already resolved. The target is the last entry in the window
/// that is not blocked and whose item is still installed. Without one, a full
/// pool falls back to a uniformly random installed item.
pub fn plan_admission(
    snapshot: &PoolSnapshot,
    item: Item,
    window: &[LedgerEntry],
    random: &dyn RandomSource,
) -> Result<Admission, AdmissionError> {
    let previous = window
        .iter()
        .filter(|entry| !entry.blocked)
        .filter_map(|entry| snapshot.find(&entry.item_id))
        .last();

    if let Some(target) = previous {
        return Ok(Admission {
            item,
            eviction: Some(target.clone()),
            change: ChangeKind::RemovedPrevious,
        });
    }

    if !snapshot.is_full() {
        return Ok(Admission {
            item,
            eviction: None,
            change: ChangeKind::Add,
        });
    }

    if snapshot.items.is_empty() {
        return Err(AdmissionError::InconsistentPoolState);
    }

    let len = snapshot.items.len();
    let index = random.pick_index(len).min(len - 1);
    Ok(Admission {
        item,
        eviction: Some(snapshot.items[index].clone()),
        change: ChangeKind::RemovedRandom,
    })
}

/// Decides and commits admissions against one external service.
pub struct AdmissionEngine {
    client: Arc<dyn ResourceClient>,
    ledger: Arc<dyn Ledger>,
    blocklist: Arc<dyn Blocklist>,
    random: Arc<dyn RandomSource>,
    call_timeout: Duration,
}

impl AdmissionEngine {
    /// Create an engine. Every external call is bounded by `call_timeout`.
    pub fn new(
        client: Arc<dyn ResourceClient>,
        ledger: Arc<dyn Ledger>,
        blocklist: Arc<dyn Blocklist>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            client,
            ledger,
            blocklist,
            random: Arc::new(ThreadRandom),
            call_timeout,
        }
    }

    /// Replace the random source used for the fallback eviction.
    #[must_use]
    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Bound applied to each external call.
    pub const fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Decide whether `request` is admissible and what it would evict.
    ///
    /// Performs reads only. A blocklisted item is rejected before the
    /// external service is contacted.
    pub async fn decide(&self, request: &AdmissionRequest) -> Result<Decision, AdmissionError> {
        if request.slots == 0 {
            return Err(AdmissionError::InvalidRequest(
                "slots must be greater than 0".into(),
            ));
        }
        let tenant = request.tenant.as_str();

        if self.blocklist.contains(tenant, &request.item_id)? {
            info!(tenant, item_id = %request.item_id, "rejected: item is blocked");
            return Ok(Decision::Reject(Rejection::Blocked {
                item_id: request.item_id.clone(),
            }));
        }

        let snapshot = self
            .call(ExternalPhase::Fetch, self.client.fetch_pool(tenant))
            .await?;
        let item = self
            .call(ExternalPhase::Fetch, self.client.fetch_item(&request.item_id))
            .await
            .map_err(|err| match err {
                AdmissionError::ExternalCallFailed {
                    source: ExternalError::NotFound(_),
                    ..
                } => AdmissionError::ItemNotFound {
                    item_id: request.item_id.clone(),
                },
                other => other,
            })?;

        let duplicates = snapshot.duplicate_names();
        if !duplicates.is_empty() {
            warn!(tenant, ?duplicates, "external pool reports duplicate item names");
        }
        info!(
            tenant,
            items = snapshot.items.len(),
            capacity = snapshot.capacity,
            "current pool"
        );

        if snapshot.find_by_name(&item.name).is_some() {
            info!(tenant, name = %item.name, "rejected: name already installed");
            return Ok(Decision::Reject(Rejection::Duplicate { name: item.name }));
        }

        let window = self.window(tenant, request.slots as usize)?;
        debug!(tenant, tracked = window.len(), slots = request.slots, "ledger window");

        let admission = plan_admission(&snapshot, item, &window, self.random.as_ref())?;
        match &admission.eviction {
            Some(target) => info!(
                tenant,
                target = %target.id,
                change = %admission.change,
                "eviction target selected"
            ),
            None => debug!(tenant, "free slot available"),
        }
        Ok(Decision::Admit(admission))
    }

    /// Apply an admitted decision: evict the target, then install.
    ///
    /// An eviction failure aborts before install. An install failure after a
    /// successful eviction is not compensated and yields
    /// [`AdmissionError::PartialCommit`].
    pub async fn commit(
        &self,
        decision: Decision,
        request: &AdmissionRequest,
    ) -> Result<CommitOutcome, AdmissionError> {
        let admission = decision.into_admission()?;
        let tenant = request.tenant.as_str();

        let evicted = match admission.eviction {
            Some(target) => {
                debug!(tenant, target = %target.id, state = ?RequestState::Evicting);
                self.call(ExternalPhase::Evict, self.client.evict(tenant, &target.id))
                    .await
                    .inspect_err(|err| {
                        warn!(tenant, target = %target.id, error = %err, "eviction failed, install skipped");
                    })?;
                self.record(tenant, &target.id, admission.change);
                info!(tenant, target = %target.id, change = %admission.change, state = ?RequestState::Evicted);
                Some(target)
            }
            None => None,
        };

        debug!(tenant, item_id = %admission.item.id, state = ?RequestState::Installing);
        if let Err(err) = self
            .call(ExternalPhase::Install, self.client.install(tenant, &admission.item.id))
            .await
        {
            return Err(match evicted {
                Some(evicted) => {
                    error!(
                        alert = "partial_commit",
                        tenant,
                        evicted = %evicted.id,
                        item_id = %admission.item.id,
                        error = %err,
                        "install failed after eviction; pool is one item short"
                    );
                    AdmissionError::PartialCommit {
                        evicted,
                        source: Box::new(err),
                    }
                }
                None => {
                    warn!(tenant, item_id = %admission.item.id, error = %err, "install failed");
                    err
                }
            });
        }
        self.record(tenant, &admission.item.id, ChangeKind::Add);
        info!(tenant, item_id = %admission.item.id, state = ?RequestState::Installed);

        Ok(CommitOutcome {
            installed: admission.item,
            evicted,
            change: admission.change,
        })
    }

    /// Block an item for a tenant and evict it if it is installed.
    ///
    /// Returns the evicted item, or `None` when it was not in the pool.
    pub async fn block_and_remove(
        &self,
        tenant: &str,
        item_id: &str,
    ) -> Result<Option<Item>, AdmissionError> {
        self.blocklist.block(tenant, item_id)?;
        info!(tenant, item_id, "item blocked");

        let snapshot = self
            .call(ExternalPhase::Fetch, self.client.fetch_pool(tenant))
            .await?;
        let Some(target) = snapshot.find(item_id).cloned() else {
            debug!(tenant, item_id, "blocked item not installed");
            return Ok(None);
        };

        self.call(ExternalPhase::Evict, self.client.evict(tenant, item_id))
            .await?;
        self.record(tenant, item_id, ChangeKind::RemovedBlocked);
        info!(tenant, item_id, "blocked item removed");
        Ok(Some(target))
    }

    /// Recent `Add` entries with `blocked` also set for items blocklisted
    /// since they were recorded.
    fn window(&self, tenant: &str, slots: usize) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.ledger
            .recent_adds(tenant, slots)?
            .into_iter()
            .map(|mut entry| {
                if !entry.blocked {
                    entry.blocked = self.blocklist.contains(tenant, &entry.item_id)?;
                }
                Ok(entry)
            })
            .collect()
    }

    /// Append a ledger entry for a mutation that already happened. A store
    /// failure here cannot undo the mutation, so it is logged, not returned.
    fn record(&self, tenant: &str, item_id: &str, change: ChangeKind) {
        let blocked = self.blocklist.contains(tenant, item_id).unwrap_or_else(|err| {
            warn!(tenant, item_id, error = %err, "blocklist lookup failed while recording");
            false
        });
        if let Err(err) = self
            .ledger
            .append(build_entry(tenant, item_id, change, blocked))
        {
            error!(
                alert = "ledger_write_failed",
                tenant,
                item_id,
                change = %change,
                error = %err,
                "committed change not recorded"
            );
        }
    }

    async fn call<T, F>(&self, phase: ExternalPhase, fut: F) -> Result<T, AdmissionError>
    where
        F: Future<Output = Result<T, ExternalError>>,
    {
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(AdmissionError::ExternalCallFailed { phase, source }),
            Err(_) => {
                let timeout_ms = u64::try_from(self.call_timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(%phase, timeout_ms, "external call timed out");
                Err(AdmissionError::Timeout { phase })
            }
        }
    }
}
