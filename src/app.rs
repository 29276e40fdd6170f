use crate::model::config::AppConfig;
use crate::model::{EnvironmentRegistry, EnvironmentState, TriggerMode};
use crate::plugin::reconciler::should_reconcile;
use crate::plugin::{
    Applied, PluginId, PluginLifecycle, PluginSet, ReconcileError, Reconciler, TagRepository,
};
use crate::request::{RequestParams, ToggleAction};
use crate::store::KeyValueStore;
use crate::ui::{Notice, ToggleLink, Toolbar};

/// What happened while bootstrapping one request.
#[derive(Debug, Default)]
pub struct Bootstrap {
    /// `None` when the trigger policy did not call for a reconcile.
    pub reconciled: Option<Result<Applied, ReconcileError>>,
    pub toggled: Option<ToggleAction>,
}

impl Bootstrap {
    pub fn applied(&self) -> Option<&Applied> {
        self.reconciled.as_ref().and_then(|result| result.as_ref().ok())
    }
}

/// Entry points the host calls at fixed places in its request pipeline.
pub struct App<S, L> {
    config: AppConfig,
    registry: EnvironmentRegistry,
    mode: TriggerMode,
    reconciler: Reconciler<S, L>,
}

impl<S: KeyValueStore, L: PluginLifecycle> App<S, L> {
    pub fn new(config: AppConfig, store: S, lifecycle: L) -> Self {
        let registry = EnvironmentRegistry::new(config.environment.name.as_deref());
        let mode = TriggerMode::from_auto_reset(config.environment.auto_reset);
        let reconciler = Reconciler::new(TagRepository::new(store), lifecycle);

        Self {
            config,
            registry,
            mode,
            reconciler,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn state(&self) -> &EnvironmentState {
        self.registry.current_environment()
    }

    pub fn mode(&self) -> TriggerMode {
        self.mode
    }

    pub fn reconciler(&mut self) -> &mut Reconciler<S, L> {
        &mut self.reconciler
    }

    pub fn lifecycle(&self) -> &L {
        self.reconciler.lifecycle()
    }

    /// Run once per request after plugins are loaded: reconcile if the
    /// trigger policy says so, then apply any requested toggle.
    pub fn bootstrap(&mut self, request: &RequestParams) -> Bootstrap {
        let reconciled = if should_reconcile(self.mode, request.wants_reset(), self.state()) {
            Some(self.reset())
        } else {
            None
        };

        let toggled = self.process_request(request);

        Bootstrap {
            reconciled,
            toggled,
        }
    }

    /// Reconcile now, regardless of trigger mode.
    pub fn reset(&mut self) -> Result<Applied, ReconcileError> {
        let state = self.registry.current_environment().clone();
        let result = self.reconciler.reconcile(&state);
        if let Err(e) = &result {
            tracing::warn!("reconcile skipped or failed: {e}");
        }
        result
    }

    /// Apply a `<short>_only` / `not<short>_only` parameter, if any.
    pub fn process_request(&mut self, request: &RequestParams) -> Option<ToggleAction> {
        let env = self.registry.environment()?;
        let action = request.toggle_action(env)?;

        let tags = self.reconciler.tags();
        match &action {
            ToggleAction::Tag(id) => tags.add(env, id.clone()),
            ToggleAction::Untag(id) => tags.remove(env, id),
        }
        Some(action)
    }

    pub fn notices(&self, bootstrap: &Bootstrap) -> Vec<Notice> {
        let mut notices = Vec::new();

        if matches!(self.state(), EnvironmentState::Missing) {
            notices.push(Notice::MissingEnvironment);
        }

        if let Some(applied) = bootstrap.applied() {
            notices.push(Notice::Reconciled(applied.environment));
        }

        notices
    }

    pub fn toolbar(&self, request_uri: &str) -> Toolbar {
        Toolbar::build(self.state(), self.mode, request_uri)
    }

    /// One link per active plugin, skipping the manager itself.
    pub fn toggle_links(&mut self, active: &PluginSet) -> Vec<ToggleLink> {
        let self_plugin = self.config.host.self_plugin.clone().map(PluginId::new);

        active
            .iter()
            .filter(|id| Some(*id) != self_plugin.as_ref())
            .filter_map(|id| self.toggle_link(id))
            .collect()
    }

    pub fn toggle_link(&mut self, plugin: &PluginId) -> Option<ToggleLink> {
        let env = self.registry.environment()?;
        let tagged = self.reconciler.tags().contains(env, plugin);
        Some(ToggleLink::build(env, plugin, tagged, &self.config.host.admin_url))
    }

    /// Async callback: apply `key=value` as a request and return the
    /// refreshed link markup for `value`.
    pub fn handle_async_toggle(&mut self, key: &str, value: &str) -> Option<String> {
        let request = RequestParams::new().with(key, value);
        self.process_request(&request);
        self.toggle_link(&PluginId::new(value)).map(|link| link.to_html())
    }
}
