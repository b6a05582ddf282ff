//! Error types for admission, commit and collaborator calls.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::serde::{Item, ItemId};

/// External call a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalPhase {
    /// Reading pool contents or item metadata.
    Fetch,
    /// Removing an item from the pool.
    Evict,
    /// Adding an item to the pool.
    Install,
}

impl fmt::Display for ExternalPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fetch => "fetch",
            Self::Evict => "evict",
            Self::Install => "install",
        })
    }
}

/// Errors reported by the external resource service and the notifier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExternalError {
    /// The referenced tenant or item does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The pool refused the install because it is full.
    #[error("pool capacity exceeded")]
    CapacityExceeded,
    /// Transport or service failure with context.
    #[error("request failed: {0}")]
    Request(String),
}

/// Errors produced by ledger and blocklist stores.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Backend-specific failure with context.
    #[error("ledger backend error: {0}")]
    Backend(String),
}

/// Errors produced while deciding or committing an admission.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// The requested item is on the tenant's blocklist.
    #[error("item {item_id} is blocked")]
    ItemBlocked {
        /// Blocked item.
        item_id: ItemId,
    },
    /// An item with the same name is already in the pool.
    #[error("item name \"{name}\" already added")]
    DuplicateItem {
        /// Name that collided.
        name: String,
    },
    /// The requested item id is unknown to the external catalog.
    #[error("item {item_id} not found")]
    ItemNotFound {
        /// Unknown item.
        item_id: ItemId,
    },
    /// The pool reports being full while holding no items.
    #[error("pool limit reached but no items to choose an eviction from")]
    InconsistentPoolState,
    /// An external call failed outright.
    #[error("{phase} failed: {source}")]
    ExternalCallFailed {
        /// Call that failed.
        phase: ExternalPhase,
        /// Underlying collaborator error.
        #[source]
        source: ExternalError,
    },
    /// An external call did not answer within the configured bound.
    #[error("{phase} timed out")]
    Timeout {
        /// Call that timed out.
        phase: ExternalPhase,
    },
    /// The eviction went through but the install did not; the pool is one
    /// item short until the install is retried.
    #[error("removed {} but install failed: {source}", .evicted.id)]
    PartialCommit {
        /// Item that was evicted.
        evicted: Item,
        /// Install failure (`ExternalCallFailed` or `Timeout`).
        #[source]
        source: Box<AdmissionError>,
    },
    /// The commit task ended without reporting a result; the pool state is
    /// unknown.
    #[error("commit aborted before reporting a result")]
    CommitAborted,
    /// Ledger or blocklist store failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// Request is malformed (zero window, no item reference, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl AdmissionError {
    /// Whether a new request with the same input may succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::ExternalCallFailed { .. } | Self::PartialCommit { .. }
        )
    }

    /// Whether this is a rejection decided from pool state or the blocklist,
    /// as opposed to a failure.
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::ItemBlocked { .. } | Self::DuplicateItem { .. } | Self::ItemNotFound { .. }
        )
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
