//! Redemption handling: decide, commit, report.
//!
//! Each redemption takes its tenant's lock and decides. An admitted request
//! hands the commit and the outcome report to a spawned task that owns the
//! lock guard. Dropping [`RedemptionService::handle`] before that point leaves
//! the pool untouched and reports nothing; after it, the commit and its report
//! finish on their own.

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::core::{
    AdmissionEngine, AdmissionError, AdmissionRequest, CommitOutcome, Decision, Notifier,
    RequestState, TenantGuard, TenantLocks,
};
use crate::runtime::api::{ItemLinkPattern, RedemptionEvent, RedemptionReport};
use crate::runtime::tokio_spawner::{Spawn, TokioSpawner};
use crate::util::serde::Item;

/// Orchestrates redemptions over an [`AdmissionEngine`].
pub struct RedemptionService<S = TokioSpawner> {
    engine: Arc<AdmissionEngine>,
    reporter: Arc<Reporter>,
    locks: Arc<TenantLocks>,
    links: ItemLinkPattern,
    spawner: S,
}

impl<S> RedemptionService<S>
where
    S: Spawn + Send + Sync,
{
    /// Create a service. Fails if `config.item_link_prefix` cannot be
    /// compiled into a link matcher.
    pub fn new(
        engine: AdmissionEngine,
        notifier: Arc<dyn Notifier>,
        spawner: S,
        config: EngineConfig,
    ) -> Result<Self, regex::Error> {
        let links = ItemLinkPattern::new(&config.item_link_prefix)?;
        Ok(Self {
            engine: Arc::new(engine),
            reporter: Arc::new(Reporter { notifier, config }),
            locks: Arc::new(TenantLocks::new()),
            links,
            spawner,
        })
    }

    /// Underlying engine.
    pub fn engine(&self) -> &AdmissionEngine {
        &self.engine
    }

    /// Tenant lock registry.
    pub fn locks(&self) -> &TenantLocks {
        &self.locks
    }

    /// Configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.reporter.config
    }

    /// Handle a redemption end to end and report the outcome.
    pub async fn handle(&self, event: &RedemptionEvent) -> RedemptionReport {
        debug!(
            tenant = event.tenant(),
            redemption = %event.request.redemption_id,
            state = ?RequestState::Received
        );
        match self.admit(event).await {
            Ok((guard, decision, request)) => {
                self.commit_detached(guard, decision, request, event).await
            }
            Err(err) => self.reporter.finish(event, Err(err)).await,
        }
    }

    /// Check whether a redemption would be admitted, without changing the
    /// pool. Failures are reported to the channel.
    pub async fn verify(&self, event: &RedemptionEvent) -> bool {
        match self.verify_decision(event).await {
            Ok(()) => true,
            Err(err) => {
                warn!(tenant = event.tenant(), error = %err, "redemption would fail");
                let message = self.reporter.failure_message(event, &err);
                self.reporter.notify(&event.channel, &message).await;
                false
            }
        }
    }

    /// Block an item for a tenant and remove it from the pool if installed.
    pub async fn block_item(
        &self,
        tenant: &str,
        item_id: &str,
    ) -> Result<Option<Item>, AdmissionError> {
        let _guard = self.locks.acquire(tenant).await;
        self.engine.block_and_remove(tenant, item_id).await
    }

    fn request_for(&self, event: &RedemptionEvent) -> Result<AdmissionRequest, AdmissionError> {
        let item_id = self.links.parse(&event.user_input)?;
        Ok(AdmissionRequest::new(
            event.tenant(),
            item_id,
            event.user_name.as_str(),
            event.slots.unwrap_or(self.reporter.config.default_slots),
        ))
    }

    /// Decide under the tenant lock. An admitted request keeps the guard.
    async fn admit(
        &self,
        event: &RedemptionEvent,
    ) -> Result<(TenantGuard, Decision, AdmissionRequest), AdmissionError> {
        let request = self.request_for(event)?;
        let guard = self.locks.acquire(&request.tenant).await;
        let decision = self.engine.decide(&request).await?;
        debug!(
            tenant = %request.tenant,
            admit = decision.is_admit(),
            state = ?RequestState::Decided
        );
        match decision {
            Decision::Reject(rejection) => Err(rejection.into()),
            admit @ Decision::Admit(_) => Ok((guard, admit, request)),
        }
    }

    async fn verify_decision(&self, event: &RedemptionEvent) -> Result<(), AdmissionError> {
        let request = self.request_for(event)?;
        let _guard = self.locks.acquire(&request.tenant).await;
        self.engine.decide(&request).await?.into_admission()?;
        Ok(())
    }

    /// Commit and report on a spawned task. The task keeps the tenant guard
    /// until the commit is over, then reports whether or not the caller is
    /// still waiting.
    async fn commit_detached(
        &self,
        guard: TenantGuard,
        decision: Decision,
        request: AdmissionRequest,
        event: &RedemptionEvent,
    ) -> RedemptionReport {
        let (tx, rx) = oneshot::channel();
        let engine = Arc::clone(&self.engine);
        let reporter = Arc::clone(&self.reporter);
        let detached = event.clone();
        self.spawner.spawn(async move {
            let result = engine.commit(decision, &request).await;
            drop(guard);
            let report = reporter.finish(&detached, result).await;
            if tx.send(report).is_err() {
                debug!(
                    tenant = detached.tenant(),
                    redemption = %detached.request.redemption_id,
                    "caller gone, outcome reported without it"
                );
            }
        });
        match rx.await {
            Ok(report) => report,
            Err(_) => {
                self.reporter
                    .finish(event, Err(AdmissionError::CommitAborted))
                    .await
            }
        }
    }
}

/// Turns results into channel messages and upstream status updates.
struct Reporter {
    notifier: Arc<dyn Notifier>,
    config: EngineConfig,
}

impl Reporter {
    async fn finish(
        &self,
        event: &RedemptionEvent,
        result: Result<CommitOutcome, AdmissionError>,
    ) -> RedemptionReport {
        let tenant = event.tenant();
        let state = RequestState::from_result(&result);
        let message = match &result {
            Ok(outcome) => {
                info!(tenant, installed = %outcome.installed.id, change = %outcome.change, "redemption fulfilled");
                self.success_message(event, outcome)
            }
            Err(err @ AdmissionError::PartialCommit { evicted, .. }) => {
                error!(
                    alert = "partial_commit",
                    tenant,
                    evicted = %evicted.id,
                    redemption = %event.request.redemption_id,
                    "redemption failed after eviction"
                );
                self.failure_message(event, err)
            }
            Err(err) => {
                warn!(tenant, error = %err, ?state, "redemption not fulfilled");
                self.failure_message(event, err)
            }
        };
        self.notify(&event.channel, &message).await;
        let success = result.is_ok();
        let status_sent = self.update_status(event, success).await;
        RedemptionReport {
            state,
            success,
            message,
            status_sent,
        }
    }

    fn success_message(&self, event: &RedemptionEvent, outcome: &CommitOutcome) -> String {
        let label = &self.config.item_label;
        let user = &event.user_name;
        let installed = &outcome.installed.name;
        match &outcome.evicted {
            Some(evicted) if !evicted.name.is_empty() => format!(
                "✅ Added new {label} {installed} redeemed by @{user} removed: {}",
                evicted.name
            ),
            Some(_) => {
                format!("✅ Added new {label} {installed} redeemed by @{user} removed: [unknown]")
            }
            None => format!("✅ Added new {label} {installed} redeemed by @{user}"),
        }
    }

    fn failure_message(&self, event: &RedemptionEvent, err: &AdmissionError) -> String {
        format!(
            "⚠️ Failed to add {} from @{} error: {err}",
            self.config.item_label, event.user_name
        )
    }

    async fn notify(&self, channel: &str, message: &str) {
        match tokio::time::timeout(
            self.config.call_timeout(),
            self.notifier.report(channel, message),
        )
        .await
        {
            Ok(Ok(())) => {}
            Ok(Err(err)) => error!(channel, error = %err, "failed to report outcome"),
            Err(_) => error!(channel, "reporting outcome timed out"),
        }
    }

    /// Returns whether the upstream ticket was updated.
    async fn update_status(&self, event: &RedemptionEvent, success: bool) -> bool {
        if self.config.internal_requester_id.as_deref() == Some(event.user_id.as_str()) {
            debug!(tenant = event.tenant(), "internal requester, upstream status skipped");
            return false;
        }
        if !event.update_status {
            return false;
        }
        match tokio::time::timeout(
            self.config.call_timeout(),
            self.notifier.set_upstream_status(&event.request, success),
        )
        .await
        {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                error!(redemption = %event.request.redemption_id, error = %err, "failed to update redemption status");
                false
            }
            Err(_) => {
                error!(redemption = %event.request.redemption_id, "updating redemption status timed out");
                false
            }
        }
    }
}
