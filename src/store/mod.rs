use std::cell::RefCell;
use std::rc::Rc;

pub mod file;
pub mod memory;

pub use file::TomlFileStore;
pub use memory::MemoryStore;

/// Flat option store provided by the host.
///
/// Values are TOML values so any store can be serialized the same way.
/// Operations never fail from the caller's point of view; implementations
/// that persist to disk log write failures instead.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<toml::Value>;

    fn set(&mut self, key: &str, value: toml::Value);

    /// Insert `default` only if `key` is absent. Returns whether it inserted.
    fn add(&mut self, key: &str, default: toml::Value) -> bool;
}

/// Shared handle, for when the tag repository and the host lifecycle use one store.
impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<RefCell<S>> {
    fn get(&self, key: &str) -> Option<toml::Value> {
        self.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: toml::Value) {
        self.borrow_mut().set(key, value)
    }

    fn add(&mut self, key: &str, default: toml::Value) -> bool {
        self.borrow_mut().add(key, default)
    }
}
