pub mod id;
pub mod lifecycle;
pub mod reconciler;
pub mod tags;

pub use id::{PluginId, PluginSet};
pub use lifecycle::{LifecycleFault, PluginLifecycle, StoreLifecycle};
pub use reconciler::{Applied, ReconcileError, Reconciler};
pub use tags::TagRepository;
