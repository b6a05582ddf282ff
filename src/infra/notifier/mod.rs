//! Notifier backends.

pub mod memory;

pub use memory::{ChannelMessage, InMemoryNotifier};
