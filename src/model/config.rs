use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_ENVIRONMENT: &str = "ENVPM_ENVIRONMENT";
pub const ENV_AUTO_RESET: &str = "ENVPM_AUTO_RESET";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub environment: EnvironmentConfig,
    pub store: StoreConfig,
    pub host: HostConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub auto_reset: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    pub admin_url: String,
    /// The manager's own plugin id; never offered a toggle link.
    #[serde(default)]
    pub self_plugin: Option<String>,
    /// Plugins the host knows about. Empty means anything may be activated.
    #[serde(default)]
    pub installed: Vec<String>,
}

const DEFAULTS: &str = include_str!("../../config/default.toml");

impl AppConfig {
    /// Load configuration with layering: defaults → user config → environment variables.
    pub fn load(user_path: Option<&Path>) -> Result<Self> {
        let user_path = match user_path {
            Some(path) => Some(path.to_path_buf()),
            None => directories::ProjectDirs::from("", "", "envpm")
                .map(|dirs| dirs.config_dir().join("config.toml"))
                .filter(|path| path.exists()),
        };

        let user_str = match user_path.as_ref() {
            Some(path) => Some(
                fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?,
            ),
            None => None,
        };

        let mut config = Self::from_layers(user_str.as_deref())?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.expand_paths()?;
        Ok(config)
    }

    /// Merge an optional user TOML document over the embedded defaults.
    pub fn from_layers(user: Option<&str>) -> Result<Self> {
        let mut table: toml::Table = toml::from_str(DEFAULTS)?;

        if let Some(user) = user {
            let user_table: toml::Table = toml::from_str(user)?;
            merge_tables(&mut table, user_table);
        }

        let config = Self::deserialize(toml::Value::Table(table))?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(name) = lookup(ENV_ENVIRONMENT) {
            self.environment.name = Some(name);
        }

        if let Some(flag) = lookup(ENV_AUTO_RESET) {
            match parse_flag(&flag) {
                Some(value) => self.environment.auto_reset = value,
                None => tracing::warn!("ignoring {ENV_AUTO_RESET}={flag:?}: not a boolean"),
            }
        }
    }

    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.store.path)
    }

    fn expand_paths(&mut self) -> Result<()> {
        if self.store.path.starts_with('~') {
            let home = dirs_home().ok_or_else(|| anyhow!("cannot determine home directory"))?;
            self.store.path = self.store.path.replacen('~', &home.to_string_lossy(), 1);
        }
        Ok(())
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(inner) => {
                if let Some(toml::Value::Table(base_inner)) = base.get_mut(&key) {
                    merge_tables(base_inner, inner);
                } else {
                    base.insert(key, toml::Value::Table(inner));
                }
            }
            other => {
                base.insert(key, other);
            }
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_environment_unset() {
        let config = AppConfig::from_layers(None).unwrap();
        assert_eq!(config.environment.name, None);
        assert!(!config.environment.auto_reset);
        assert!(config.host.installed.is_empty());
        assert_eq!(config.host.self_plugin.as_deref(), Some("envpm/envpm.php"));
    }

    #[test]
    fn user_layer_merges_per_key() {
        let config = AppConfig::from_layers(Some(
            r#"
            [environment]
            name = "staging"

            [host]
            installed = ["a/a.php"]
            "#,
        ))
        .unwrap();

        assert_eq!(config.environment.name.as_deref(), Some("staging"));
        assert!(!config.environment.auto_reset);
        assert_eq!(config.host.installed, vec!["a/a.php".to_string()]);
        assert_eq!(config.host.admin_url, "http://localhost/wp-admin");
    }

    #[test]
    fn env_overrides_win() {
        let mut config = AppConfig::from_layers(Some("[environment]\nname = \"staging\"")).unwrap();
        config.apply_env_overrides(|key| match key {
            ENV_ENVIRONMENT => Some("production".to_string()),
            ENV_AUTO_RESET => Some("yes".to_string()),
            _ => None,
        });

        assert_eq!(config.environment.name.as_deref(), Some("production"));
        assert!(config.environment.auto_reset);
    }

    #[test]
    fn bad_auto_reset_flag_is_ignored() {
        let mut config = AppConfig::from_layers(Some("[environment]\nauto_reset = true")).unwrap();
        config.apply_env_overrides(|key| (key == ENV_AUTO_RESET).then(|| "maybe".to_string()));
        assert!(config.environment.auto_reset);
    }
}
