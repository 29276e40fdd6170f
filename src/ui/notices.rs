use crate::model::config::ENV_ENVIRONMENT;
use crate::model::{Environment, EnvironmentState, TriggerMode};
use crate::request::RESET_PARAM;
use crate::ui::escape_html;

/// Admin banners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// No environment configured; everything is disabled.
    MissingEnvironment,
    /// The active plugin list now matches `Environment`.
    Reconciled(Environment),
}

impl Notice {
    pub fn is_warning(&self) -> bool {
        matches!(self, Notice::MissingEnvironment)
    }

    pub fn message(&self) -> String {
        match self {
            Notice::MissingEnvironment => format!(
                "Warning: the environment plugin manager is active, but no environment is \
                 configured. Set {ENV_ENVIRONMENT} (or environment.name) to one of: \
                 development, staging, production."
            ),
            Notice::Reconciled(env) => {
                format!("The list of active plugins was updated to the {env} environment.")
            }
        }
    }

    pub fn to_html(&self) -> String {
        let class = if self.is_warning() { "error" } else { "updated" };
        format!(
            r#"<div class="{class}"><p>{}</p></div>"#,
            escape_html(&self.message())
        )
    }
}

/// Toolbar control showing the current environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toolbar {
    Hidden,
    /// Manual mode: clicking re-requests the page with the reset flag.
    ResetLink { title: String, href: String },
    /// Auto mode: nothing to click, reconciliation already ran.
    AutoIndicator { title: String },
}

impl Toolbar {
    pub fn build(state: &EnvironmentState, mode: TriggerMode, request_uri: &str) -> Self {
        let Some(env) = state.environment() else {
            return Toolbar::Hidden;
        };

        match mode {
            TriggerMode::Auto => Toolbar::AutoIndicator {
                title: format!("Plugins Environment: {env} (auto-reset)"),
            },
            TriggerMode::Manual => Toolbar::ResetLink {
                title: format!("Reset Plugins Environment ({env})"),
                href: with_reset_flag(request_uri),
            },
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Toolbar::ResetLink { .. })
    }

    pub fn to_html(&self) -> Option<String> {
        match self {
            Toolbar::Hidden => None,
            Toolbar::ResetLink { title, href } => Some(format!(
                r#"<a class="env-plugins-reset-button" href="{}">{}</a>"#,
                escape_html(href),
                escape_html(title)
            )),
            Toolbar::AutoIndicator { title } => Some(format!(
                r#"<span class="env-plugins-reset-button env-plugins-auto">{}</span>"#,
                escape_html(title)
            )),
        }
    }
}

fn with_reset_flag(uri: &str) -> String {
    if uri.contains(RESET_PARAM) {
        return uri.to_string();
    }
    let separator = if uri.contains('?') { '&' } else { '?' };
    format!("{uri}{separator}{RESET_PARAM}")
}
