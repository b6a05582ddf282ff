//! Builders to assemble the engine and redemption service from configuration.

use std::sync::Arc;

use anyhow::{anyhow, Context};

use crate::config::EngineConfig;
use crate::core::{AdmissionEngine, AppResult, Blocklist, Ledger, Notifier, ResourceClient};
use crate::runtime::{RedemptionService, Spawn, TokioSpawner};

/// Build an engine after validating `cfg`.
pub fn build_engine(
    cfg: &EngineConfig,
    client: Arc<dyn ResourceClient>,
    ledger: Arc<dyn Ledger>,
    blocklist: Arc<dyn Blocklist>,
) -> AppResult<AdmissionEngine> {
    cfg.validate().map_err(|e| anyhow!("config invalid: {e}"))?;
    Ok(AdmissionEngine::new(
        client,
        ledger,
        blocklist,
        cfg.call_timeout(),
    ))
}

/// Build a redemption service over the given collaborators.
pub fn build_redemption_service<S>(
    cfg: EngineConfig,
    client: Arc<dyn ResourceClient>,
    ledger: Arc<dyn Ledger>,
    blocklist: Arc<dyn Blocklist>,
    notifier: Arc<dyn Notifier>,
    spawner: S,
) -> AppResult<RedemptionService<S>>
where
    S: Spawn + Send + Sync,
{
    let engine = build_engine(&cfg, client, ledger, blocklist)?;
    RedemptionService::new(engine, notifier, spawner, cfg)
        .context("item_link_prefix does not form a valid link pattern")
}

/// Build a redemption service that spawns commits on the current Tokio
/// runtime.
pub fn build_on_current_runtime(
    cfg: EngineConfig,
    client: Arc<dyn ResourceClient>,
    ledger: Arc<dyn Ledger>,
    blocklist: Arc<dyn Blocklist>,
    notifier: Arc<dyn Notifier>,
) -> AppResult<RedemptionService<TokioSpawner>> {
    let spawner = TokioSpawner::current().context("no tokio runtime to spawn commits on")?;
    build_redemption_service(cfg, client, ledger, blocklist, notifier, spawner)
}
