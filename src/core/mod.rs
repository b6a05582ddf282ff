//! Admission engine, collaborator contracts and tenant serialization.

pub mod engine;
pub mod error;
pub mod ledger;
pub mod notifier;
pub mod random;
pub mod resource;
pub mod tenant_lock;

pub use engine::{
    plan_admission, Admission, AdmissionEngine, AdmissionRequest, CommitOutcome, Decision,
    Rejection, RequestState,
};
pub use error::{AdmissionError, AppResult, ExternalError, ExternalPhase, LedgerError};
pub use ledger::{build_entry, Blocklist, Ledger, LedgerEntry};
pub use notifier::{Notifier, RequestRef};
pub use random::{RandomSource, SeededRandom, ThreadRandom};
pub use resource::{PoolSnapshot, ResourceClient};
pub use tenant_lock::{TenantGuard, TenantLocks};
