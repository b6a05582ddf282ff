//! External resource service adapters.

pub mod memory;

pub use memory::InMemoryResourceClient;
