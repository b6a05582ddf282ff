//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Prefix for environment variables read by [`EngineConfig::from_env`].
pub const ENV_PREFIX: &str = "SLOT_ROTATION_";

/// Settings for the admission engine and redemption handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Bound on each external call, in milliseconds.
    pub call_timeout_ms: u64,
    /// Lookback window used when a redemption does not carry its own.
    pub default_slots: u32,
    /// Requester whose redemptions never update the upstream ticket.
    #[serde(default)]
    pub internal_requester_id: Option<String>,
    /// Noun used for items in outcome messages.
    #[serde(default = "default_item_label")]
    pub item_label: String,
    /// Host and path that precede an item id in a catalog link.
    #[serde(default = "default_item_link_prefix")]
    pub item_link_prefix: String,
}

fn default_item_label() -> String {
    "7tv emote".into()
}

fn default_item_link_prefix() -> String {
    "7tv.app/emotes/".into()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: 5_000,
            default_slots: 1,
            internal_requester_id: None,
            item_label: default_item_label(),
            item_link_prefix: default_item_link_prefix(),
        }
    }
}

impl EngineConfig {
    /// Bound on each external call.
    pub const fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.call_timeout_ms == 0 {
            return Err("call_timeout_ms must be greater than 0".into());
        }
        if self.default_slots == 0 {
            return Err("default_slots must be greater than 0".into());
        }
        if self.item_link_prefix.trim().is_empty() {
            return Err("item_link_prefix must not be empty".into());
        }
        if self
            .internal_requester_id
            .as_deref()
            .is_some_and(|id| id.trim().is_empty())
        {
            return Err("internal_requester_id must not be blank".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load `.env` if present, then read `SLOT_ROTATION_*` variables over
    /// the defaults and validate.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_vars(std::env::vars())
    }

    /// Build configuration from `(name, value)` pairs using the
    /// `SLOT_ROTATION_*` names. Unknown names are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut cfg = Self::default();
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value: String = value.into();
            match name {
                "CALL_TIMEOUT_MS" => {
                    cfg.call_timeout_ms = value
                        .parse()
                        .map_err(|e| format!("{ENV_PREFIX}{name}: {e}"))?;
                }
                "DEFAULT_SLOTS" => {
                    cfg.default_slots = value
                        .parse()
                        .map_err(|e| format!("{ENV_PREFIX}{name}: {e}"))?;
                }
                "INTERNAL_REQUESTER_ID" => cfg.internal_requester_id = Some(value),
                "ITEM_LABEL" => cfg.item_label = value,
                "ITEM_LINK_PREFIX" => cfg.item_link_prefix = value,
                _ => {}
            }
        }
        cfg.validate()?;
        Ok(cfg)
    }
}
