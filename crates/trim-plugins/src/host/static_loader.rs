//! In-process host loader for plugins compiled into the player.
//!
//! Plugins register a factory and any extension factories up front. The
//! loader then behaves like a dynamic host: [`HostLoader::discover`] makes the
//! registered plugins visible, [`HostLoader::start`] instantiates them, and
//! extension queries construct contributions from started plugins only.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::{HostError, HostInstance, HostLoader, HostState};
use crate::error::PluginError;
use crate::extension::{Extension, ExtensionPoint};
use crate::identity::PluginIdentity;
use crate::sync::lock;

/// Tracing target for host loader operations.
const HOST_TARGET: &str = "trim_plugins::host";

type PluginFactory = Arc<dyn Fn() -> Result<HostInstance, PluginError> + Send + Sync>;
type ExtensionFactory =
    Arc<dyn Fn() -> Result<Extension, Box<dyn std::error::Error + Send + Sync>> + Send + Sync>;

struct Registration {
    identity: PluginIdentity,
    factory: PluginFactory,
    extensions: Vec<(ExtensionPoint, ExtensionFactory)>,
}

struct LoadedPlugin {
    state: HostState,
    instance: Option<HostInstance>,
}

/// Host loader backed by statically registered plugin factories.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use trim_plugins::{
///     HostInstance, HostLoader, HostState, PluginBase, PluginIdentity, StaticHostLoader,
/// };
///
/// let mut host = StaticHostLoader::new();
/// let identity = PluginIdentity::new("org.example.eq", "1.0.0", "1.0.0").expect("valid");
/// host.register_plugin(identity, || {
///     Ok(HostInstance::trim(Arc::new(PluginBase::new(
///         "org.example.eq", "Equaliser", "1.0.0", "1.0.0",
///     )?)))
/// });
///
/// assert_eq!(host.state_of("org.example.eq"), None);
/// host.discover().expect("discover");
/// assert_eq!(host.state_of("org.example.eq"), Some(HostState::Discovered));
/// host.start("org.example.eq").expect("start");
/// assert!(host.instance_of("org.example.eq").is_some());
/// ```
#[derive(Default)]
pub struct StaticHostLoader {
    registrations: BTreeMap<String, Registration>,
    loaded: Mutex<BTreeMap<String, LoadedPlugin>>,
}

impl StaticHostLoader {
    /// Creates a loader with no registered plugins.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin factory under `identity`. A later registration
    /// with the same id replaces the earlier one.
    pub fn register_plugin<F>(&mut self, identity: PluginIdentity, factory: F) -> &mut Self
    where
        F: Fn() -> Result<HostInstance, PluginError> + Send + Sync + 'static,
    {
        let id = identity.id().to_owned();
        self.registrations.insert(
            id,
            Registration {
                identity,
                factory: Arc::new(factory),
                extensions: Vec::new(),
            },
        );
        self
    }

    /// Registers a contribution of capability type `T` for a registered
    /// plugin. The factory runs on every extension query while the plugin
    /// is started.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::UnknownPlugin`] when `plugin_id` has not been
    /// registered.
    pub fn register_extension<T, F>(
        &mut self,
        plugin_id: &str,
        factory: F,
    ) -> Result<&mut Self, HostError>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn() -> Result<Arc<T>, Box<dyn std::error::Error + Send + Sync>>
            + Send
            + Sync
            + 'static,
    {
        let registration =
            self.registrations
                .get_mut(plugin_id)
                .ok_or_else(|| HostError::UnknownPlugin {
                    id: plugin_id.to_owned(),
                })?;
        let owner = plugin_id.to_owned();
        let wrapped: ExtensionFactory =
            Arc::new(move || factory().map(|value| Extension::new(owner.clone(), value)));
        registration
            .extensions
            .push((ExtensionPoint::of::<T>(), wrapped));
        Ok(self)
    }

    /// Returns the number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Returns `true` when no plugins are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    fn instantiate(&self, id: &str) -> Result<HostInstance, HostError> {
        let registration = self
            .registrations
            .get(id)
            .ok_or_else(|| HostError::UnknownPlugin { id: id.to_owned() })?;
        let factory = Arc::clone(&registration.factory);
        match panic::catch_unwind(AssertUnwindSafe(|| factory())) {
            Ok(Ok(instance)) => Ok(instance),
            Ok(Err(error)) => Err(HostError::StartFailed {
                id: id.to_owned(),
                message: error.to_string(),
            }),
            Err(_) => Err(HostError::StartFailed {
                id: id.to_owned(),
                message: String::from("plugin factory panicked"),
            }),
        }
    }
}

impl HostLoader for StaticHostLoader {
    fn discover(&self) -> Result<Vec<PluginIdentity>, HostError> {
        let mut loaded = lock(&self.loaded);
        for id in self.registrations.keys() {
            loaded.entry(id.clone()).or_insert_with(|| LoadedPlugin {
                state: HostState::Discovered,
                instance: None,
            });
        }
        debug!(
            target: HOST_TARGET,
            count = self.registrations.len(),
            "discovered registered plugins"
        );
        Ok(self
            .registrations
            .values()
            .map(|registration| registration.identity.clone())
            .collect())
    }

    fn start(&self, id: &str) -> Result<(), HostError> {
        let mut loaded = lock(&self.loaded);
        let plugin = loaded
            .get_mut(id)
            .ok_or_else(|| HostError::UnknownPlugin { id: id.to_owned() })?;
        if plugin.state == HostState::Started {
            return Ok(());
        }
        if plugin.instance.is_none() {
            plugin.instance = Some(self.instantiate(id)?);
        }
        plugin.state = HostState::Started;
        debug!(target: HOST_TARGET, plugin = id, "plugin started");
        Ok(())
    }

    fn stop(&self, id: &str) -> Result<(), HostError> {
        let mut loaded = lock(&self.loaded);
        let plugin = loaded
            .get_mut(id)
            .ok_or_else(|| HostError::UnknownPlugin { id: id.to_owned() })?;
        if plugin.state == HostState::Started {
            plugin.state = HostState::Stopped;
            debug!(target: HOST_TARGET, plugin = id, "plugin stopped");
        }
        Ok(())
    }

    fn state_of(&self, id: &str) -> Option<HostState> {
        lock(&self.loaded).get(id).map(|plugin| plugin.state)
    }

    fn instance_of(&self, id: &str) -> Option<HostInstance> {
        lock(&self.loaded)
            .get(id)
            .filter(|plugin| plugin.state == HostState::Started)
            .and_then(|plugin| plugin.instance.clone())
    }

    fn extensions_of(&self, point: ExtensionPoint) -> Vec<Result<Extension, HostError>> {
        let factories: Vec<(String, ExtensionFactory)> = {
            let loaded = lock(&self.loaded);
            self.registrations
                .iter()
                .filter(|(id, _)| {
                    loaded
                        .get(id.as_str())
                        .is_some_and(|plugin| plugin.state == HostState::Started)
                })
                .flat_map(|(id, registration)| {
                    registration
                        .extensions
                        .iter()
                        .filter(|(registered, _)| *registered == point)
                        .map(|(_, factory)| (id.clone(), Arc::clone(factory)))
                })
                .collect()
        };

        factories
            .into_iter()
            .map(|(id, factory)| {
                let failure = |message: String| HostError::ExtensionFailed {
                    id: id.clone(),
                    point: point.name().to_owned(),
                    message,
                };
                match panic::catch_unwind(AssertUnwindSafe(|| factory())) {
                    Ok(Ok(extension)) => Ok(extension),
                    Ok(Err(error)) => Err(failure(error.to_string())),
                    Err(_) => Err(failure(String::from("extension factory panicked"))),
                }
            })
            .collect()
    }

    fn unload_all(&self) {
        lock(&self.loaded).clear();
        debug!(target: HOST_TARGET, "all plugins unloaded");
    }
}
