//! In-memory notifier.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::{ExternalError, Notifier, RequestRef};

/// Message posted to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    /// Message text.
    pub text: String,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

/// Records reports and upstream status updates for inspection.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    messages: Mutex<HashMap<String, Vec<ChannelMessage>>>,
    statuses: Mutex<Vec<(RequestRef, bool)>>,
}

impl InMemoryNotifier {
    /// Create an empty notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages posted to `channel`, oldest first, at most `limit`.
    pub fn messages(&self, channel: &str, limit: usize) -> Vec<ChannelMessage> {
        self.messages
            .lock()
            .get(channel)
            .map(|msgs| msgs.iter().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    /// Text of the most recent message posted to `channel`.
    pub fn last_message(&self, channel: &str) -> Option<String> {
        self.messages
            .lock()
            .get(channel)
            .and_then(|msgs| msgs.last())
            .map(|msg| msg.text.clone())
    }

    /// Upstream status updates in the order they were sent.
    pub fn statuses(&self) -> Vec<(RequestRef, bool)> {
        self.statuses.lock().clone()
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn report(&self, channel: &str, message: &str) -> Result<(), ExternalError> {
        self.messages
            .lock()
            .entry(channel.to_owned())
            .or_default()
            .push(ChannelMessage {
                text: message.to_owned(),
                created_at_ms: crate::util::clock::now_ms(),
            });
        Ok(())
    }

    async fn set_upstream_status(
        &self,
        request: &RequestRef,
        success: bool,
    ) -> Result<(), ExternalError> {
        self.statuses.lock().push((request.clone(), success));
        Ok(())
    }
}
