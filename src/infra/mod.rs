//! Infrastructure adapters for the ledger, resource service and notifier.

pub mod ledger;
pub mod notifier;
pub mod resource;

pub use ledger::InMemoryLedger;
pub use notifier::InMemoryNotifier;
pub use resource::InMemoryResourceClient;
