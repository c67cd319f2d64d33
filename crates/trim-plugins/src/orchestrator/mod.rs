//! Plugin lifecycle orchestration.
//!
//! The [`Orchestrator`] reconciles the persisted enablement policy with the
//! host loader's runtime state. It owns the application-level state machine
//! (`Unloaded → Loading → Loaded → Unloading → Unloaded`, with `Failed`
//! reachable from the transitional states) and keeps it separate from the
//! host's *started* state.
//!
//! Locking: `lifecycle` serialises [`Orchestrator::initialize`] and
//! [`Orchestrator::shutdown`]; per-id gates serialise transitions of one id;
//! the registry lock is only held for short bookkeeping steps. Locks are
//! always taken in that order.

mod registry;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use self::registry::Registry;
use crate::contract::{self, DEFAULT_DESCRIPTION, Hook};
use crate::error::PluginError;
use crate::extension::ExtensionPoint;
use crate::host::{HostError, HostLoader, HostState};
use crate::identity::PluginIdentity;
use crate::reporter::{LifecycleReporter, StructuredLifecycleReporter};
use crate::store::EnablementStore;
use crate::sync::lock;

pub use self::registry::{ActiveInstance, LifecycleState};

/// Tracing target for orchestrator internals.
const ORCHESTRATOR_TARGET: &str = "trim_plugins::orchestrator";

/// One row of the plugin catalogue, covering every discovered plugin
/// whether or not it is loaded.
#[derive(Debug, Clone)]
pub struct PluginListing {
    /// Identity reported by the host at discovery.
    pub identity: PluginIdentity,
    /// Persisted enablement flag.
    pub enabled: bool,
    /// Host-level state, when the host still knows the id.
    pub host_state: Option<HostState>,
    /// Application-level state.
    pub state: LifecycleState,
    /// Display name when loaded, otherwise the plugin id.
    pub display_name: String,
    /// Description when loaded, otherwise the default description.
    pub description: String,
    /// Most recent failure, if any.
    pub failure: Option<Arc<PluginError>>,
}

/// Drives a [`HostLoader`] according to the policy held in an
/// [`EnablementStore`].
///
/// No operation returns per-plugin failures. They are logged through the
/// [`LifecycleReporter`] and recorded as [`LifecycleState::Failed`] with the
/// reason available from [`Orchestrator::failure`].
pub struct Orchestrator<H> {
    host: H,
    store: EnablementStore,
    reporter: Arc<dyn LifecycleReporter>,
    registry: Registry,
    gates: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    lifecycle: Mutex<bool>,
}

impl<H: HostLoader> Orchestrator<H> {
    /// Creates an orchestrator that reports through `tracing`.
    #[must_use]
    pub fn new(host: H, store: EnablementStore) -> Self {
        Self {
            host,
            store,
            reporter: Arc::new(StructuredLifecycleReporter::new()),
            registry: Registry::default(),
            gates: Mutex::new(HashMap::new()),
            lifecycle: Mutex::new(false),
        }
    }

    /// Replaces the lifecycle reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn LifecycleReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Host loader driven by this orchestrator.
    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// Enablement store consulted by this orchestrator.
    #[must_use]
    pub const fn store(&self) -> &EnablementStore {
        &self.store
    }

    /// Returns whether [`Orchestrator::initialize`] has completed since the
    /// last shutdown.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        *lock(&self.lifecycle)
    }

    /// Discovers plugins and brings each one in line with its policy.
    ///
    /// Does nothing once initialised; call [`Orchestrator::shutdown`] first
    /// to discover again. A failed discovery leaves the orchestrator
    /// uninitialised so the call can be retried.
    pub fn initialize(&self) {
        let mut initialized = lock(&self.lifecycle);
        if *initialized {
            debug!(target: ORCHESTRATOR_TARGET, "initialize skipped; already initialized");
            return;
        }
        self.reporter.initialize_started();

        let identities = match self.host.discover() {
            Ok(identities) => identities,
            Err(error) => {
                self.reporter.discovery_failed(&error);
                return;
            }
        };
        self.registry.set_discovered(&identities);

        for identity in &identities {
            self.reconcile(identity.id());
        }

        *initialized = true;
        self.reporter
            .initialize_completed(identities.len(), self.registry.active_ids().len());
    }

    /// Records `desired` for `id` and converges the plugin on it.
    ///
    /// Ids the host does not know keep the stored policy for a later
    /// discovery. Failures leave the id [`LifecycleState::Failed`]; the
    /// stored flag always reflects `desired`.
    pub fn set_enabled(&self, id: &str, desired: bool) {
        let gate = self.gate(id);
        let _guard = lock(&gate);

        if let Err(error) = self.store.set_enabled(id, desired) {
            self.reporter.persistence_failed(&error);
        }

        let Some(host_state) = self.host.state_of(id) else {
            self.reporter.policy_deferred(id, desired);
            return;
        };

        if desired {
            self.enable(id, host_state);
        } else {
            self.disable(id);
        }
    }

    /// Unloads every active plugin, stops and releases every host plugin,
    /// and marks the orchestrator uninitialised. Does nothing when not
    /// initialised.
    pub fn shutdown(&self) {
        let mut initialized = lock(&self.lifecycle);
        if !*initialized {
            debug!(target: ORCHESTRATOR_TARGET, "shutdown skipped; not initialized");
            return;
        }

        for id in self.registry.active_ids() {
            let gate = self.gate(&id);
            let _guard = lock(&gate);
            self.deactivate(&id);
        }

        // A toggle may have finished loading after the first pass.
        for identity in self.registry.discovered() {
            let gate = self.gate(identity.id());
            let _guard = lock(&gate);
            self.deactivate(identity.id());
            self.stop_if_started(identity.id());
        }

        self.host.unload_all();
        self.registry.clear_discovered();
        *initialized = false;
        self.reporter.shutdown_completed();
    }

    /// Returns the stored enablement flag, `true` for unknown ids.
    #[must_use]
    pub fn is_enabled(&self, id: &str) -> bool {
        self.store.is_enabled(id)
    }

    /// Returns the active instance for `id`.
    #[must_use]
    pub fn get_plugin(&self, id: &str) -> Option<ActiveInstance> {
        self.registry.active(id)
    }

    /// Returns every active instance, ordered by id.
    #[must_use]
    pub fn list_active(&self) -> Vec<ActiveInstance> {
        self.registry.active_list()
    }

    /// Returns the lifecycle state of an id the orchestrator has processed.
    #[must_use]
    pub fn status(&self, id: &str) -> Option<LifecycleState> {
        self.registry.state(id)
    }

    /// Returns the most recent failure recorded for `id`.
    #[must_use]
    pub fn failure(&self, id: &str) -> Option<Arc<PluginError>> {
        self.registry.failure(id)
    }

    /// Collects contributions of capability type `T` from every started
    /// plugin. Faulty contributions are reported and skipped.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use trim_plugins::{
    ///     EnablementStore, HostInstance, Orchestrator, PluginBase, PluginIdentity,
    ///     StaticHostLoader, ToolbarButtonExtension,
    /// };
    ///
    /// struct Shuffle;
    ///
    /// impl ToolbarButtonExtension for Shuffle {
    ///     fn text(&self) -> &str { "Shuffle" }
    ///     fn on_action(&self) {}
    /// }
    ///
    /// let mut host = StaticHostLoader::new();
    /// let identity = PluginIdentity::new("org.example.shuffle", "1.0.0", "1.0.0").expect("valid");
    /// host.register_plugin(identity, || {
    ///     let plugin = PluginBase::new("org.example.shuffle", "Shuffle", "1.0.0", "1.0.0")?;
    ///     Ok(HostInstance::trim(Arc::new(plugin)))
    /// });
    /// host.register_extension::<dyn ToolbarButtonExtension, _>("org.example.shuffle", || {
    ///     Ok(Arc::new(Shuffle) as Arc<dyn ToolbarButtonExtension>)
    /// })
    /// .expect("registered");
    ///
    /// let dir = tempfile::tempdir().expect("temp dir");
    /// let orchestrator = Orchestrator::new(host, EnablementStore::open(dir.path().join("c.json")));
    /// orchestrator.initialize();
    ///
    /// let buttons = orchestrator.extensions::<dyn ToolbarButtonExtension>();
    /// assert_eq!(buttons.len(), 1);
    /// ```
    #[must_use]
    pub fn extensions<T>(&self) -> Vec<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let point = ExtensionPoint::of::<T>();
        self.host
            .extensions_of(point)
            .into_iter()
            .filter_map(|contribution| {
                let extension = match contribution {
                    Ok(extension) => extension,
                    Err(error) => {
                        self.reporter.extension_skipped(point, &error);
                        return None;
                    }
                };
                let value = extension.downcast::<T>();
                if value.is_none() {
                    self.reporter.extension_skipped(
                        point,
                        &HostError::ExtensionFailed {
                            id: extension.plugin_id().to_owned(),
                            point: point.name().to_owned(),
                            message: format!(
                                "contribution was registered for {}",
                                extension.point()
                            ),
                        },
                    );
                }
                value
            })
            .collect()
    }

    /// Lists every plugin from the latest discovery with its policy and
    /// state.
    #[must_use]
    pub fn catalog(&self) -> Vec<PluginListing> {
        self.registry
            .discovered()
            .into_iter()
            .map(|identity| self.listing(identity))
            .collect()
    }

    /// Describes one discovered plugin.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::UnknownPluginId`] when the latest discovery did
    /// not report `id`.
    pub fn describe(&self, id: &str) -> Result<PluginListing, PluginError> {
        self.registry
            .discovered_identity(id)
            .map(|identity| self.listing(identity))
            .ok_or_else(|| PluginError::UnknownPluginId { id: id.to_owned() })
    }

    /// Returns stored ids that the latest discovery did not report.
    ///
    /// Records are never pruned automatically; callers may pass these ids to
    /// [`EnablementStore::forget`].
    #[must_use]
    pub fn stale_records(&self) -> Vec<String> {
        self.store
            .snapshot()
            .into_keys()
            .filter(|id| !self.registry.is_discovered(id))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Transitions. Callers hold the gate for `id`.
    // -----------------------------------------------------------------------

    fn reconcile(&self, id: &str) {
        let gate = self.gate(id);
        let _guard = lock(&gate);

        if let Err(error) = self.store.observe(id) {
            self.reporter.persistence_failed(&error);
        }

        let host_state = self.host.state_of(id);
        if self.store.is_enabled(id) {
            if let Some(state) = host_state {
                self.enable(id, state);
            }
        } else if host_state == Some(HostState::Started) {
            self.disable(id);
        }
    }

    fn enable(&self, id: &str, host_state: HostState) {
        let started_here = if host_state == HostState::Started {
            false
        } else {
            if let Err(source) = self.host.start(id) {
                self.fail(id, host_failure(id, source));
                return;
            }
            true
        };

        if !self.registry.is_active(id) {
            self.activate(id, started_here);
        }
    }

    fn disable(&self, id: &str) {
        if !self.deactivate(id) {
            self.registry.mark_unloaded(id);
        }
        self.stop_if_started(id);
    }

    /// Fetches, verifies, records, and loads `id`. When loading fails and
    /// this call started the host plugin, the start is rolled back.
    fn activate(&self, id: &str, started_here: bool) {
        self.registry.begin_load(id);

        match self.load(id) {
            Ok(instance) => {
                self.registry.finish_load(instance.clone());
                self.reporter.plugin_loaded(&instance);
            }
            Err(error) => {
                if started_here {
                    if let Err(source) = self.host.stop(id) {
                        self.reporter
                            .plugin_failed(id, &host_failure(id, source));
                    }
                }
                self.fail(id, error);
            }
        }
    }

    fn load(&self, id: &str) -> Result<ActiveInstance, PluginError> {
        let instance = self
            .host
            .instance_of(id)
            .ok_or_else(|| host_failure(id, HostError::MissingInstance { id: id.to_owned() }))?;
        let active = contract::verify(id, instance)?;

        if let Err(error) = self.store.record_version(id, active.identity().version()) {
            self.reporter.persistence_failed(&error);
        }

        contract::invoke_hook(active.plugin().as_ref(), Hook::Load).map_err(|source| {
            PluginError::HookFailure {
                id: id.to_owned(),
                hook: Hook::Load,
                source,
            }
        })?;
        Ok(active)
    }

    /// Runs the unload hook of an active `id` and removes it. Returns
    /// whether `id` was active.
    fn deactivate(&self, id: &str) -> bool {
        let Some(instance) = self.registry.begin_unload(id) else {
            return false;
        };

        let failure = contract::invoke_hook(instance.plugin().as_ref(), Hook::Unload)
            .err()
            .map(|source| {
                Arc::new(PluginError::HookFailure {
                    id: id.to_owned(),
                    hook: Hook::Unload,
                    source,
                })
            });
        if let Some(error) = &failure {
            self.reporter.plugin_failed(id, error);
        }

        self.registry.finish_unload(id, failure);
        self.reporter.plugin_unloaded(id);
        true
    }

    fn stop_if_started(&self, id: &str) {
        if self.host.state_of(id) != Some(HostState::Started) {
            return;
        }
        if let Err(source) = self.host.stop(id) {
            self.fail(id, host_failure(id, source));
        }
    }

    fn fail(&self, id: &str, error: PluginError) {
        self.reporter.plugin_failed(id, &error);
        self.registry.mark_failed(id, Arc::new(error));
    }

    fn listing(&self, identity: PluginIdentity) -> PluginListing {
        let id = identity.id();
        let (display_name, description) = self.registry.active(id).map_or_else(
            || (id.to_owned(), DEFAULT_DESCRIPTION.to_owned()),
            |instance| {
                (
                    instance.display_name().to_owned(),
                    instance.description().to_owned(),
                )
            },
        );
        let enabled = self.store.is_enabled(id);
        let host_state = self.host.state_of(id);
        let state = self.registry.state(id).unwrap_or_default();
        let failure = self.registry.failure(id);
        PluginListing {
            identity,
            enabled,
            host_state,
            state,
            display_name,
            description,
            failure,
        }
    }

    fn gate(&self, id: &str) -> Arc<Mutex<()>> {
        Arc::clone(lock(&self.gates).entry(id.to_owned()).or_default())
    }
}

fn host_failure(id: &str, source: HostError) -> PluginError {
    PluginError::Host {
        id: id.to_owned(),
        source,
    }
}
