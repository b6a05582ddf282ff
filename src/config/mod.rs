//! Configuration models for the engine and redemption handling.

pub mod engine;

pub use engine::{EngineConfig, ENV_PREFIX};
