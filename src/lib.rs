//! # Prometheus Slot Rotation
//!
//! Tenant-scoped admission and eviction for externally owned item pools.
//!
//! Each tenant owns a pool with a fixed number of slots in an external
//! service. Users redeem requests to install a new item; when the pool is full
//! an existing item has to go first. This crate decides what goes, performs the
//! eviction and the install as two separate external calls, and keeps an
//! append-only ledger of what it changed so the next decision can rotate out
//! the oldest item it added itself.
//!
//! ## Key Features
//!
//! - **Ground truth per decision**: pool contents are fetched for every
//!   request, never cached
//! - **Windowed rotation**: the eviction target is the least recent tracked
//!   addition within a configurable lookback window, with a random fallback
//!   when the window has nothing left in the pool
//! - **Two-phase commit**: evict, then install; an install failure after an
//!   eviction is surfaced as a partial commit instead of being hidden
//! - **Per-tenant serialization**: a keyed lock per tenant, no global lock
//! - **Bounded external calls**: every call carries a timeout
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use prometheus_slot_rotation::builders::build_on_current_runtime;
//! use prometheus_slot_rotation::config::EngineConfig;
//! use prometheus_slot_rotation::infra::{InMemoryLedger, InMemoryNotifier, InMemoryResourceClient};
//!
//! let ledger = Arc::new(InMemoryLedger::new());
//! let service = build_on_current_runtime(
//!     EngineConfig::from_env()?,
//!     Arc::new(InMemoryResourceClient::new()),
//!     ledger.clone(),
//!     ledger,
//!     Arc::new(InMemoryNotifier::new()),
//! )?;
//!
//! let report = service.handle(&event).await;
//! ```
//!
//! For complete examples, see `tests/admission_engine_test.rs` and
//! `tests/redemption_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Admission engine, collaborator contracts and tenant serialization.
pub mod core;
/// Configuration models for the engine.
pub mod config;
/// Builders to construct the engine and services from configuration.
pub mod builders;
/// In-memory adapters for the ledger, resource service and notifier.
pub mod infra;
/// Redemption orchestration and runtime adapters.
pub mod runtime;
/// Shared utilities.
pub mod util;
