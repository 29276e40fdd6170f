#![allow(dead_code)]

use envpm::AppConfig;
use envpm::plugin::{LifecycleFault, PluginId, PluginLifecycle, PluginSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Activate(PluginSet),
    Deactivate(PluginSet),
}

/// Records host calls in order; optionally fails one of them.
#[derive(Debug, Default)]
pub struct RecordingLifecycle {
    pub calls: Vec<Call>,
    pub fail_deactivate: bool,
}

impl PluginLifecycle for RecordingLifecycle {
    fn activate(&mut self, plugins: &PluginSet) -> Result<(), LifecycleFault> {
        self.calls.push(Call::Activate(plugins.clone()));
        Ok(())
    }

    fn deactivate(&mut self, plugins: &PluginSet) -> Result<(), LifecycleFault> {
        self.calls.push(Call::Deactivate(plugins.clone()));
        if self.fail_deactivate {
            return Err("deactivation hook panicked".into());
        }
        Ok(())
    }
}

pub fn ids(items: &[&str]) -> PluginSet {
    items.iter().copied().map(PluginId::from).collect()
}

pub fn config(environment: Option<&str>, auto_reset: bool) -> AppConfig {
    let mut config = AppConfig::from_layers(None).expect("embedded defaults parse");
    config.environment.name = environment.map(str::to_string);
    config.environment.auto_reset = auto_reset;
    config.host.admin_url = "http://site.test/wp-admin".to_string();
    config
}
