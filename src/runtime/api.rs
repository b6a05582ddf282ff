//! Inbound redemption models and report types.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::{AdmissionError, RequestRef, RequestState};
use crate::util::serde::ItemId;

/// A redemption delivered by the upstream event source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionEvent {
    /// Upstream ticket; also names the tenant.
    pub request: RequestRef,
    /// Channel name outcome messages are posted to.
    pub channel: String,
    /// Upstream id of the redeeming user.
    pub user_id: String,
    /// Display name of the redeeming user.
    pub user_name: String,
    /// Free-form text entered with the redemption; carries the item link.
    pub user_input: String,
    /// Lookback window configured on the reward, if any.
    #[serde(default)]
    pub slots: Option<u32>,
    /// Whether the upstream ticket should be marked fulfilled/failed.
    #[serde(default = "default_update_status")]
    pub update_status: bool,
}

const fn default_update_status() -> bool {
    true
}

impl RedemptionEvent {
    /// Tenant the redemption targets.
    pub fn tenant(&self) -> &str {
        &self.request.tenant
    }
}

/// Result of handling one redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionReport {
    /// Terminal state reached.
    pub state: RequestState,
    /// Whether the item was installed.
    pub success: bool,
    /// Message posted to the channel.
    pub message: String,
    /// Whether the upstream ticket was updated.
    pub status_sent: bool,
}

/// Compiled matcher for catalog links such as `https://7tv.app/emotes/<id>`.
///
/// Built once per service from the configured link prefix.
#[derive(Debug, Clone)]
pub struct ItemLinkPattern {
    regex: Regex,
}

impl ItemLinkPattern {
    /// Compile a matcher for `http(s)://<link_prefix><id>`, where the id is a
    /// run of ASCII letters, digits and underscores.
    pub fn new(link_prefix: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!(
            r"https?://{}([0-9A-Za-z_]*)",
            regex::escape(link_prefix)
        ))?;
        Ok(Self { regex })
    }

    /// Extract the item id. Exactly one link must be present.
    pub fn parse(&self, input: &str) -> Result<ItemId, AdmissionError> {
        let ids: Vec<&str> = self
            .regex
            .captures_iter(input)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .collect();

        match ids.as_slice() {
            [id] if !id.is_empty() => Ok((*id).to_owned()),
            [_] => Err(AdmissionError::InvalidRequest("item link has no id".into())),
            [] => Err(AdmissionError::InvalidRequest("no item link found".into())),
            _ => Err(AdmissionError::InvalidRequest(
                "more than one item link found".into(),
            )),
        }
    }
}
