//! Shared serializable identifiers and value types.

use serde::{Deserialize, Serialize};

/// Identifier of a tenant (channel) owning one external pool.
pub type TenantId = String;

/// Identifier of an item in the external catalog.
pub type ItemId = String;

/// An item as reported by the external resource service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    /// Catalog identifier.
    pub id: ItemId,
    /// Display name; unique within one pool.
    pub name: String,
}

impl Item {
    /// Build an item from id and name.
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// How a ledger entry changed the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Item was installed.
    Add,
    /// Item was evicted because it was the oldest tracked addition.
    RemovedPrevious,
    /// Item was evicted at random because no tracked addition qualified.
    RemovedRandom,
    /// Item was evicted by an operator block.
    RemovedBlocked,
}

impl ChangeKind {
    /// Whether this kind records an eviction.
    pub const fn is_removal(self) -> bool {
        !matches!(self, Self::Add)
    }

    /// Stable lowercase label used in logs and storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::RemovedPrevious => "removed_previous",
            Self::RemovedRandom => "removed_random",
            Self::RemovedBlocked => "removed_blocked",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
