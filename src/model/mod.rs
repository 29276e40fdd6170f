pub mod config;
pub mod environment;
pub mod mode;

pub use environment::{Environment, EnvironmentError, EnvironmentRegistry, EnvironmentState};
pub use mode::TriggerMode;
