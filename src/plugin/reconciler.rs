use thiserror::Error;

use crate::model::{Environment, EnvironmentError, EnvironmentState, TriggerMode};
use crate::plugin::id::{PluginSet, display_set};
use crate::plugin::lifecycle::{LifecycleFault, PluginLifecycle};
use crate::plugin::tags::TagRepository;
use crate::store::KeyValueStore;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error("deactivating plugins for {environment} failed: {source}")]
    Deactivate {
        environment: Environment,
        #[source]
        source: LifecycleFault,
    },

    #[error("activating plugins for {environment} failed: {source}")]
    Activate {
        environment: Environment,
        #[source]
        source: LifecycleFault,
    },
}

/// What a successful reconcile asked the host to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub environment: Environment,
    pub activated: PluginSet,
    pub deactivated: PluginSet,
}

/// Decides whether a bootstrap should reconcile.
///
/// Auto mode always does. Manual mode needs the reset flag on the request
/// and a configured environment.
pub fn should_reconcile(
    mode: TriggerMode,
    reset_requested: bool,
    state: &EnvironmentState,
) -> bool {
    match mode {
        TriggerMode::Auto => true,
        TriggerMode::Manual => reset_requested && !matches!(state, EnvironmentState::Missing),
    }
}

#[derive(Debug)]
pub struct Reconciler<S, L> {
    tags: TagRepository<S>,
    lifecycle: L,
}

impl<S: KeyValueStore, L: PluginLifecycle> Reconciler<S, L> {
    pub fn new(tags: TagRepository<S>, lifecycle: L) -> Self {
        Self { tags, lifecycle }
    }

    pub fn tags(&mut self) -> &mut TagRepository<S> {
        &mut self.tags
    }

    pub fn lifecycle(&self) -> &L {
        &self.lifecycle
    }

    pub fn desired_active_set(&mut self, env: Environment) -> PluginSet {
        self.tags.get(env)
    }

    /// Union of every other environment's tag set.
    ///
    /// A plugin tagged for both `env` and another environment shows up here
    /// too; it ends up active because activation runs last.
    pub fn desired_inactive_set(&mut self, env: Environment) -> PluginSet {
        env.others().flat_map(|other| self.tags.get(other)).collect()
    }

    /// Deactivate the other environments' plugins, then activate this one's.
    ///
    /// A host fault stops the run where it happened. Nothing is rolled back.
    pub fn reconcile(&mut self, state: &EnvironmentState) -> Result<Applied, ReconcileError> {
        let environment = state.require()?;

        let deactivated = self.desired_inactive_set(environment);
        let activated = self.desired_active_set(environment);

        self.lifecycle
            .deactivate(&deactivated)
            .map_err(|source| ReconcileError::Deactivate {
                environment,
                source,
            })?;
        self.lifecycle
            .activate(&activated)
            .map_err(|source| ReconcileError::Activate {
                environment,
                source,
            })?;

        tracing::info!(
            "reconciled {environment}: active [{}], inactive [{}]",
            display_set(&activated),
            display_set(&deactivated)
        );

        Ok(Applied {
            environment,
            activated,
            deactivated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::id::PluginId;
    use crate::store::MemoryStore;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Activate(PluginSet),
        Deactivate(PluginSet),
    }

    #[derive(Debug, Default)]
    struct Recorder {
        calls: Vec<Call>,
        fail_activate: bool,
    }

    impl PluginLifecycle for Recorder {
        fn activate(&mut self, plugins: &PluginSet) -> Result<(), LifecycleFault> {
            self.calls.push(Call::Activate(plugins.clone()));
            if self.fail_activate {
                return Err("host refused".into());
            }
            Ok(())
        }

        fn deactivate(&mut self, plugins: &PluginSet) -> Result<(), LifecycleFault> {
            self.calls.push(Call::Deactivate(plugins.clone()));
            Ok(())
        }
    }

    fn ids(items: &[&str]) -> PluginSet {
        items.iter().copied().map(PluginId::from).collect()
    }

    fn seeded(recorder: Recorder) -> Reconciler<MemoryStore, Recorder> {
        let mut tags = TagRepository::new(MemoryStore::new());
        tags.add(Environment::Development, "a".into());
        tags.add(Environment::Development, "b".into());
        tags.add(Environment::Staging, "c".into());
        Reconciler::new(tags, recorder)
    }

    #[test]
    fn deactivates_others_then_activates_current() {
        let mut reconciler = seeded(Recorder::default());
        let applied = reconciler
            .reconcile(&EnvironmentState::Valid(Environment::Development))
            .unwrap();

        assert_eq!(applied.activated, ids(&["a", "b"]));
        assert_eq!(applied.deactivated, ids(&["c"]));
        assert_eq!(
            reconciler.lifecycle().calls,
            vec![
                Call::Deactivate(ids(&["c"])),
                Call::Activate(ids(&["a", "b"]))
            ]
        );
    }

    #[test]
    fn inactive_set_unions_all_other_environments() {
        let mut reconciler = seeded(Recorder::default());
        reconciler.tags().add(Environment::Production, "p".into());

        assert_eq!(
            reconciler.desired_inactive_set(Environment::Development),
            ids(&["c", "p"])
        );
        assert_eq!(
            reconciler.desired_inactive_set(Environment::Staging),
            ids(&["a", "b", "p"])
        );
        let active = reconciler.desired_active_set(Environment::Development);
        let inactive = reconciler.desired_inactive_set(Environment::Development);
        assert!(active.is_disjoint(&inactive));
    }

    #[test]
    fn disabled_environment_makes_no_host_calls() {
        let mut reconciler = seeded(Recorder::default());

        let missing = reconciler.reconcile(&EnvironmentState::Missing);
        assert!(matches!(
            missing,
            Err(ReconcileError::Environment(EnvironmentError::Missing))
        ));

        let invalid = reconciler.reconcile(&EnvironmentState::Invalid("qa".into()));
        assert!(matches!(
            invalid,
            Err(ReconcileError::Environment(EnvironmentError::Invalid(_)))
        ));
        assert!(reconciler.lifecycle().calls.is_empty());
    }

    #[test]
    fn activate_fault_is_reported_without_rollback() {
        let mut reconciler = seeded(Recorder {
            fail_activate: true,
            ..Recorder::default()
        });

        let err = reconciler
            .reconcile(&EnvironmentState::Valid(Environment::Development))
            .unwrap_err();

        assert!(matches!(err, ReconcileError::Activate { .. }));
        assert_eq!(
            err.to_string(),
            "activating plugins for development failed: host refused"
        );
        assert_eq!(reconciler.lifecycle().calls.len(), 2);
    }

    #[test]
    fn plugin_in_two_sets_is_deactivated_then_activated() {
        let mut reconciler = seeded(Recorder::default());
        reconciler.tags().add(Environment::Development, "d".into());
        reconciler.tags().add(Environment::Staging, "d".into());

        let applied = reconciler
            .reconcile(&EnvironmentState::Valid(Environment::Development))
            .unwrap();

        assert!(applied.deactivated.contains(&PluginId::from("d")));
        assert!(applied.activated.contains(&PluginId::from("d")));
        assert_eq!(
            reconciler.lifecycle().calls.last(),
            Some(&Call::Activate(ids(&["a", "b", "d"])))
        );
    }

    #[test]
    fn reconcile_twice_gives_same_split() {
        let mut reconciler = seeded(Recorder::default());
        let state = EnvironmentState::Valid(Environment::Staging);
        let first = reconciler.reconcile(&state).unwrap();
        let second = reconciler.reconcile(&state).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn trigger_policy() {
        let valid = EnvironmentState::Valid(Environment::Production);
        assert!(should_reconcile(TriggerMode::Auto, false, &valid));
        assert!(should_reconcile(TriggerMode::Manual, true, &valid));
        assert!(!should_reconcile(TriggerMode::Manual, false, &valid));
        assert!(!should_reconcile(TriggerMode::Manual, true, &EnvironmentState::Missing));
    }
}
