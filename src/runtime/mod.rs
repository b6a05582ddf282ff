//! Redemption orchestration and runtime adapters.

pub mod api;
pub mod redemption;
pub mod tokio_spawner;

pub use api::{ItemLinkPattern, RedemptionEvent, RedemptionReport};
pub use redemption::RedemptionService;
pub use tokio_spawner::{Spawn, TokioSpawner};
