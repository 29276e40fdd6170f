use std::collections::BTreeSet;
use std::fmt;

/// Opaque plugin identifier as the host names it (e.g. `akismet/akismet.php`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginId(pub String);

impl PluginId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PluginId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

pub type PluginSet = BTreeSet<PluginId>;

/// Read a stored array of strings. Anything else reads as an empty set.
pub(crate) fn set_from_value(key: &str, value: Option<toml::Value>) -> PluginSet {
    match value {
        None => PluginSet::new(),
        Some(toml::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                toml::Value::String(id) => Some(PluginId(id)),
                other => {
                    tracing::warn!("{key}: skipping non-string entry {other}");
                    None
                }
            })
            .collect(),
        Some(other) => {
            tracing::warn!("{key}: expected an array, found {}", other.type_str());
            PluginSet::new()
        }
    }
}

pub(crate) fn set_to_value(set: &PluginSet) -> toml::Value {
    toml::Value::Array(
        set.iter()
            .map(|id| toml::Value::String(id.0.clone()))
            .collect(),
    )
}

/// Render a set as `a, b, c` for logs and status output.
pub fn display_set(set: &PluginSet) -> String {
    if set.is_empty() {
        return "(none)".to_string();
    }
    set.iter().map(PluginId::as_str).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_values_read_as_empty() {
        assert!(set_from_value("k", Some(toml::Value::Integer(3))).is_empty());
        assert!(set_from_value("k", None).is_empty());

        let mixed = toml::Value::Array(vec![
            toml::Value::String("a".into()),
            toml::Value::Boolean(true),
        ]);
        assert_eq!(set_from_value("k", Some(mixed)), PluginSet::from([PluginId::from("a")]));
    }
}
