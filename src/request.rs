use std::collections::BTreeMap;

use crate::model::Environment;
use crate::plugin::PluginId;

/// Request flag that asks for a manual reconcile.
pub const RESET_PARAM: &str = "reset_env_plugins";

/// Request parameter names for tagging and untagging in one environment.
///
/// Link building and request parsing both read these constants, so the two
/// can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleKeys {
    pub add: &'static str,
    pub remove: &'static str,
}

const DEV_KEYS: ToggleKeys = ToggleKeys {
    add: "dev_only",
    remove: "notdev_only",
};
const STAGE_KEYS: ToggleKeys = ToggleKeys {
    add: "stage_only",
    remove: "notstage_only",
};
const PROD_KEYS: ToggleKeys = ToggleKeys {
    add: "prod_only",
    remove: "notprod_only",
};

impl ToggleKeys {
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => DEV_KEYS,
            Environment::Staging => STAGE_KEYS,
            Environment::Production => PROD_KEYS,
        }
    }
}

/// A tag-set mutation requested by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleAction {
    Tag(PluginId),
    Untag(PluginId),
}

impl ToggleAction {
    pub fn plugin(&self) -> &PluginId {
        match self {
            ToggleAction::Tag(id) | ToggleAction::Untag(id) => id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    params: BTreeMap<String, String>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string (leading `?` allowed). A bare name such as
    /// `reset_env_plugins` is present with an empty value.
    pub fn parse(query: &str) -> Result<Self, serde_urlencoded::de::Error> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)?;
        Ok(Self {
            params: pairs.into_iter().collect(),
        })
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn wants_reset(&self) -> bool {
        self.params.contains_key(RESET_PARAM)
    }

    /// The toggle this request asks for in `env`. Tagging wins over untagging
    /// when both are present; empty values are ignored.
    pub fn toggle_action(&self, env: Environment) -> Option<ToggleAction> {
        let keys = ToggleKeys::for_environment(env);
        let non_empty = |key: &str| self.get(key).filter(|value| !value.is_empty());

        if let Some(id) = non_empty(keys.add) {
            return Some(ToggleAction::Tag(PluginId::new(id)));
        }
        non_empty(keys.remove).map(|id| ToggleAction::Untag(PluginId::new(id)))
    }
}
