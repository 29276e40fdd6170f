use crate::model::Environment;
use crate::plugin::id::{PluginId, PluginSet, set_from_value, set_to_value};
use crate::store::KeyValueStore;

/// Per-environment plugin tag sets on top of the host's option store.
///
/// Every mutation re-reads, edits and rewrites the whole set. There is no
/// locking; concurrent writers race and the last write wins.
#[derive(Debug)]
pub struct TagRepository<S> {
    store: S,
}

impl<S: KeyValueStore> TagRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn key(env: Environment) -> String {
        format!("envpm_{}", env.shortname())
    }

    /// The set tagged for `env`, creating an empty one on first access.
    pub fn get(&mut self, env: Environment) -> PluginSet {
        let key = Self::key(env);
        if self.store.add(&key, set_to_value(&PluginSet::new())) {
            tracing::debug!("created empty tag set {key}");
        }
        set_from_value(&key, self.store.get(&key))
    }

    pub fn contains(&mut self, env: Environment, plugin: &PluginId) -> bool {
        self.get(env).contains(plugin)
    }

    pub fn add(&mut self, env: Environment, plugin: PluginId) {
        let mut set = self.get(env);
        if set.insert(plugin.clone()) {
            tracing::info!("tagged {plugin} for {env}");
        }
        self.store.set(&Self::key(env), set_to_value(&set));
    }

    pub fn remove(&mut self, env: Environment, plugin: &PluginId) {
        let mut set = self.get(env);
        if set.remove(plugin) {
            tracing::info!("untagged {plugin} from {env}");
        }
        self.store.set(&Self::key(env), set_to_value(&set));
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
