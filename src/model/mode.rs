/// When reconciliation is allowed to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerMode {
    /// Only on an explicit `reset_env_plugins` request.
    #[default]
    Manual,
    /// On every bootstrap, request flag ignored.
    Auto,
}

impl TriggerMode {
    pub fn from_auto_reset(auto_reset: bool) -> Self {
        if auto_reset { Self::Auto } else { Self::Manual }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TriggerMode::Manual => "MANUAL",
            TriggerMode::Auto => "AUTO",
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, TriggerMode::Manual)
    }
}
