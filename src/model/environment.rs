use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Deployment context a plugin can be tagged for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub const ALL: [Environment; 3] = [
        Environment::Development,
        Environment::Staging,
        Environment::Production,
    ];

    /// Full lowercase name, as written in configuration.
    pub fn label(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    /// Short name used to derive store keys and request parameter names.
    pub fn shortname(&self) -> &'static str {
        match self {
            Environment::Development => "dev",
            Environment::Staging => "stage",
            Environment::Production => "prod",
        }
    }

    /// Every environment except `self`.
    pub fn others(self) -> impl Iterator<Item = Environment> {
        Self::ALL.into_iter().filter(move |env| *env != self)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Environment {
    type Err = EnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|env| env.label() == s)
            .ok_or_else(|| EnvironmentError::Invalid(s.to_string()))
    }
}

pub fn is_valid_environment(name: &str) -> bool {
    name.parse::<Environment>().is_ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvironmentError {
    #[error("no environment configured (expected one of: development, staging, production)")]
    Missing,

    #[error("unknown environment {0:?} (expected one of: development, staging, production)")]
    Invalid(String),
}

/// Outcome of resolving the configured environment name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentState {
    Missing,
    Invalid(String),
    Valid(Environment),
}

impl EnvironmentState {
    pub fn resolve(name: Option<&str>) -> Self {
        let Some(raw) = name.filter(|raw| !raw.is_empty()) else {
            return Self::Missing;
        };

        match raw.parse() {
            Ok(env) => Self::Valid(env),
            Err(_) => Self::Invalid(raw.to_string()),
        }
    }

    pub fn environment(&self) -> Option<Environment> {
        match self {
            Self::Valid(env) => Some(*env),
            _ => None,
        }
    }

    pub fn require(&self) -> Result<Environment, EnvironmentError> {
        match self {
            Self::Missing => Err(EnvironmentError::Missing),
            Self::Invalid(raw) => Err(EnvironmentError::Invalid(raw.clone())),
            Self::Valid(env) => Ok(*env),
        }
    }
}

/// Holds the environment selected at startup.
#[derive(Debug, Clone)]
pub struct EnvironmentRegistry {
    state: EnvironmentState,
}

impl EnvironmentRegistry {
    pub fn new(name: Option<&str>) -> Self {
        let state = EnvironmentState::resolve(name);
        match &state {
            EnvironmentState::Missing => {
                tracing::warn!("no environment configured, plugin environments disabled")
            }
            EnvironmentState::Invalid(raw) => {
                tracing::warn!("invalid environment {raw:?}, plugin environments disabled")
            }
            EnvironmentState::Valid(env) => tracing::info!("current environment: {env}"),
        }
        Self { state }
    }

    pub fn current_environment(&self) -> &EnvironmentState {
        &self.state
    }

    pub fn environment(&self) -> Option<Environment> {
        self.state.environment()
    }
}
