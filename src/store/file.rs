use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::KeyValueStore;

/// Option store kept in a single TOML file.
///
/// The whole table is rewritten on every mutation. A failed write is logged
/// and the in-memory value is kept.
#[derive(Debug)]
pub struct TomlFileStore {
    path: PathBuf,
    values: toml::Table,
}

impl TomlFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let values = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("reading store {}", path.display()))?;
            toml::from_str(&raw).with_context(|| format!("parsing store {}", path.display()))?
        } else {
            toml::Table::new()
        };

        tracing::debug!("opened store {} ({} keys)", path.display(), values.len());
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string(&self.values)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    fn persist(&self, key: &str) {
        if let Err(e) = self.save() {
            tracing::error!("store write failed for {key} ({}): {e:#}", self.path.display());
        }
    }
}

impl KeyValueStore for TomlFileStore {
    fn get(&self, key: &str) -> Option<toml::Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: toml::Value) {
        self.values.insert(key.to_string(), value);
        self.persist(key);
    }

    fn add(&mut self, key: &str, default: toml::Value) -> bool {
        if self.values.contains_key(key) {
            return false;
        }
        self.values.insert(key.to_string(), default);
        self.persist(key);
        true
    }
}
