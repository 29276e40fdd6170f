use thiserror::Error;

use crate::plugin::id::{PluginId, PluginSet, set_from_value, set_to_value};
use crate::store::KeyValueStore;

/// Cause of a failed activate/deactivate call, as reported by the host.
pub type LifecycleFault = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Host capability that actually switches plugins on and off.
///
/// Both calls are expected to be idempotent: activating an active plugin or
/// deactivating an inactive one is a no-op.
pub trait PluginLifecycle {
    fn activate(&mut self, plugins: &PluginSet) -> Result<(), LifecycleFault>;

    fn deactivate(&mut self, plugins: &PluginSet) -> Result<(), LifecycleFault>;
}

impl<L: PluginLifecycle + ?Sized> PluginLifecycle for Box<L> {
    fn activate(&mut self, plugins: &PluginSet) -> Result<(), LifecycleFault> {
        (**self).activate(plugins)
    }

    fn deactivate(&mut self, plugins: &PluginSet) -> Result<(), LifecycleFault> {
        (**self).deactivate(plugins)
    }
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("plugin not installed: {0}")]
    NotInstalled(PluginId),
}

pub const ACTIVE_PLUGINS_KEY: &str = "active_plugins";

/// Reference host lifecycle: the active list is an option in the store.
#[derive(Debug)]
pub struct StoreLifecycle<S> {
    store: S,
    installed: PluginSet,
}

impl<S: KeyValueStore> StoreLifecycle<S> {
    /// `installed` restricts what may be activated; empty allows anything.
    pub fn new(store: S, installed: impl IntoIterator<Item = PluginId>) -> Self {
        Self {
            store,
            installed: installed.into_iter().collect(),
        }
    }

    pub fn active_plugins(&self) -> PluginSet {
        set_from_value(ACTIVE_PLUGINS_KEY, self.store.get(ACTIVE_PLUGINS_KEY))
    }

    fn write_active(&mut self, active: &PluginSet) {
        self.store.set(ACTIVE_PLUGINS_KEY, set_to_value(active));
    }
}

impl<S: KeyValueStore> PluginLifecycle for StoreLifecycle<S> {
    fn activate(&mut self, plugins: &PluginSet) -> Result<(), LifecycleFault> {
        if !self.installed.is_empty() {
            if let Some(missing) = plugins.iter().find(|id| !self.installed.contains(*id)) {
                return Err(HostError::NotInstalled(missing.clone()).into());
            }
        }

        let mut active = self.active_plugins();
        let before = active.len();
        active.extend(plugins.iter().cloned());
        if active.len() != before {
            tracing::info!("activated {} plugin(s)", active.len() - before);
        }
        self.write_active(&active);
        Ok(())
    }

    fn deactivate(&mut self, plugins: &PluginSet) -> Result<(), LifecycleFault> {
        let mut active = self.active_plugins();
        let before = active.len();
        active.retain(|id| !plugins.contains(id));
        if active.len() != before {
            tracing::info!("deactivated {} plugin(s)", before - active.len());
        }
        self.write_active(&active);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn ids(items: &[&str]) -> PluginSet {
        items.iter().copied().map(PluginId::from).collect()
    }

    #[test]
    fn activate_and_deactivate_are_idempotent() {
        let mut host = StoreLifecycle::new(MemoryStore::new(), []);
        host.activate(&ids(&["a", "b"])).unwrap();
        host.activate(&ids(&["a"])).unwrap();
        assert_eq!(host.active_plugins(), ids(&["a", "b"]));

        host.deactivate(&ids(&["b", "z"])).unwrap();
        host.deactivate(&ids(&["b"])).unwrap();
        assert_eq!(host.active_plugins(), ids(&["a"]));
    }

    #[test]
    fn unknown_plugin_faults_without_writing() {
        let mut host = StoreLifecycle::new(MemoryStore::new(), ids(&["a"]));
        let err = host.activate(&ids(&["a", "ghost"])).unwrap_err();
        assert_eq!(err.to_string(), "plugin not installed: ghost");
        assert!(host.active_plugins().is_empty());
    }
}
