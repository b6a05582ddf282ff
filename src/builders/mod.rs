//! Builders to construct the engine and services from configuration.

pub mod service_builder;

pub use service_builder::{build_engine, build_on_current_runtime, build_redemption_service};
