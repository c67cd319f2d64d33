//! Runtime bookkeeping owned by the orchestrator.
//!
//! The registry holds the identities from the latest discovery, the active
//! set, and the lifecycle state of every id the orchestrator has touched.
//! All three live behind one `RwLock` so that inserting an active instance
//! and marking it loaded is a single step. Hooks never run while the lock is
//! held.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::contract::TrimPlugin;
use crate::error::PluginError;
use crate::identity::PluginIdentity;
use crate::sync::{read, write};

/// Application-level lifecycle state of a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    /// No load hook has run, or the unload hook has completed.
    #[default]
    Unloaded,
    /// Fetching, verifying, and running the load hook.
    Loading,
    /// The load hook succeeded; the instance is active.
    Loaded,
    /// The unload hook is running.
    Unloading,
    /// A lifecycle step failed. Enabling the plugin again retries.
    Failed,
}

impl LifecycleState {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unloaded => "unloaded",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Unloading => "unloading",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A plugin whose load hook has succeeded and whose unload hook has not yet
/// run. Clones share the underlying plugin handle.
#[derive(Clone)]
pub struct ActiveInstance {
    identity: PluginIdentity,
    display_name: String,
    description: String,
    plugin: Arc<dyn TrimPlugin>,
}

impl ActiveInstance {
    pub(crate) fn new(identity: PluginIdentity, plugin: Arc<dyn TrimPlugin>) -> Self {
        Self {
            display_name: plugin.display_name().to_owned(),
            description: plugin.description().to_owned(),
            identity,
            plugin,
        }
    }

    /// Unique plugin identifier.
    #[must_use]
    pub const fn id(&self) -> &str {
        self.identity.id()
    }

    /// Verified identity captured when the plugin loaded.
    #[must_use]
    pub const fn identity(&self) -> &PluginIdentity {
        &self.identity
    }

    /// Human-readable name.
    #[must_use]
    pub const fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Human-readable description.
    #[must_use]
    pub const fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Shared handle to the plugin object.
    #[must_use]
    pub const fn plugin(&self) -> &Arc<dyn TrimPlugin> {
        &self.plugin
    }
}

impl fmt::Debug for ActiveInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveInstance")
            .field("identity", &self.identity)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct Status {
    state: LifecycleState,
    failure: Option<Arc<PluginError>>,
}

#[derive(Default)]
struct RegistryState {
    discovered: BTreeMap<String, PluginIdentity>,
    active: BTreeMap<String, ActiveInstance>,
    statuses: HashMap<String, Status>,
}

#[derive(Default)]
pub(crate) struct Registry {
    state: RwLock<RegistryState>,
}

impl Registry {
    pub(crate) fn set_discovered(&self, identities: &[PluginIdentity]) {
        write(&self.state).discovered = identities
            .iter()
            .map(|identity| (identity.id().to_owned(), identity.clone()))
            .collect();
    }

    pub(crate) fn clear_discovered(&self) {
        write(&self.state).discovered.clear();
    }

    pub(crate) fn discovered(&self) -> Vec<PluginIdentity> {
        read(&self.state).discovered.values().cloned().collect()
    }

    pub(crate) fn discovered_identity(&self, id: &str) -> Option<PluginIdentity> {
        read(&self.state).discovered.get(id).cloned()
    }

    pub(crate) fn is_discovered(&self, id: &str) -> bool {
        read(&self.state).discovered.contains_key(id)
    }

    pub(crate) fn active(&self, id: &str) -> Option<ActiveInstance> {
        read(&self.state).active.get(id).cloned()
    }

    pub(crate) fn is_active(&self, id: &str) -> bool {
        read(&self.state).active.contains_key(id)
    }

    pub(crate) fn active_list(&self) -> Vec<ActiveInstance> {
        read(&self.state).active.values().cloned().collect()
    }

    pub(crate) fn active_ids(&self) -> Vec<String> {
        read(&self.state).active.keys().cloned().collect()
    }

    pub(crate) fn state(&self, id: &str) -> Option<LifecycleState> {
        read(&self.state).statuses.get(id).map(|status| status.state)
    }

    pub(crate) fn failure(&self, id: &str) -> Option<Arc<PluginError>> {
        read(&self.state)
            .statuses
            .get(id)
            .and_then(|status| status.failure.clone())
    }

    /// Enters `Loading`, discarding any earlier failure.
    pub(crate) fn begin_load(&self, id: &str) {
        let mut state = write(&self.state);
        let status = state.statuses.entry(id.to_owned()).or_default();
        status.state = LifecycleState::Loading;
        status.failure = None;
    }

    pub(crate) fn finish_load(&self, instance: ActiveInstance) {
        let mut state = write(&self.state);
        let id = instance.id().to_owned();
        state.active.insert(id.clone(), instance);
        state.statuses.entry(id).or_default().state = LifecycleState::Loaded;
    }

    pub(crate) fn mark_failed(&self, id: &str, error: Arc<PluginError>) {
        let mut state = write(&self.state);
        state.active.remove(id);
        let status = state.statuses.entry(id.to_owned()).or_default();
        status.state = LifecycleState::Failed;
        status.failure = Some(error);
    }

    /// Marks a known id `Unloaded` without touching its failure note.
    pub(crate) fn mark_unloaded(&self, id: &str) {
        if let Some(status) = write(&self.state).statuses.get_mut(id) {
            status.state = LifecycleState::Unloaded;
        }
    }

    /// Enters `Unloading` and returns the instance whose unload hook should
    /// run, or `None` when `id` is not active.
    pub(crate) fn begin_unload(&self, id: &str) -> Option<ActiveInstance> {
        let mut state = write(&self.state);
        let instance = state.active.get(id).cloned()?;
        state.statuses.entry(id.to_owned()).or_default().state = LifecycleState::Unloading;
        Some(instance)
    }

    /// Removes the instance and enters `Unloaded`, keeping `failure` as a
    /// note when the unload hook failed.
    pub(crate) fn finish_unload(&self, id: &str, failure: Option<Arc<PluginError>>) {
        let mut state = write(&self.state);
        state.active.remove(id);
        let status = state.statuses.entry(id.to_owned()).or_default();
        status.state = LifecycleState::Unloaded;
        status.failure = failure;
    }
}
