use super::KeyValueStore;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: toml::Table,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<toml::Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: toml::Value) {
        self.values.insert(key.to_string(), value);
    }

    fn add(&mut self, key: &str, default: toml::Value) -> bool {
        if self.values.contains_key(key) {
            return false;
        }
        self.values.insert(key.to_string(), default);
        true
    }
}
