//! Environment-scoped plugin management.
//!
//! Plugins are tagged as belonging to development, staging or production.
//! On reconcile, the plugins tagged for the running environment are
//! activated and those tagged for any other environment are deactivated.
//! Storage and the actual activation are host collaborators
//! ([`store::KeyValueStore`], [`plugin::PluginLifecycle`]).

pub mod app;
pub mod model;
pub mod plugin;
pub mod request;
pub mod store;
pub mod ui;

pub use app::{App, Bootstrap};
pub use model::config::AppConfig;
pub use model::{Environment, EnvironmentState, TriggerMode};
pub use plugin::{PluginId, PluginSet};
pub use request::RequestParams;
