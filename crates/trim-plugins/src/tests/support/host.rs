//! Host loader wrapper that records start and stop calls.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use crate::contract::TrimPlugin;
use crate::extension::{Extension, ExtensionPoint, ToolbarButtonExtension};
use crate::host::{HostError, HostInstance, HostLoader, HostState, StaticHostLoader};
use crate::identity::PluginIdentity;

use super::plugin::{Behaviour, Probe, log_call};

/// Ordered record of hook and host calls.
pub(crate) type CallLog = Arc<Mutex<Vec<String>>>;

struct Label(String);

impl ToolbarButtonExtension for Label {
    fn text(&self) -> &str {
        self.0.as_str()
    }

    fn on_action(&self) {}
}

/// Wraps a [`StaticHostLoader`], logging `start:<id>` and `stop:<id>` and
/// hiding selected ids from discovery until revealed.
pub(crate) struct RecordingHost {
    inner: StaticHostLoader,
    log: CallLog,
    hidden: Mutex<BTreeSet<String>>,
}

impl RecordingHost {
    pub(crate) fn new(log: CallLog) -> Self {
        Self {
            inner: StaticHostLoader::new(),
            log,
            hidden: Mutex::new(BTreeSet::new()),
        }
    }

    /// Registers a probe plugin that contributes a toolbar button labelled
    /// with its id.
    pub(crate) fn add_probe(&mut self, id: &str, load: Behaviour, unload: Behaviour) {
        let log = Arc::clone(&self.log);
        let owned = id.to_owned();
        let identity = PluginIdentity::new(id, "1.4.0", "1.0.0").expect("valid identity");
        self.inner.register_plugin(identity, move || {
            let plugin: Arc<dyn TrimPlugin> =
                Arc::new(Probe::new(&owned, Arc::clone(&log), load, unload));
            Ok(HostInstance::trim(plugin))
        });
        let label = id.to_owned();
        self.inner
            .register_extension::<dyn ToolbarButtonExtension, _>(id, move || {
                Ok(Arc::new(Label(label.clone())) as Arc<dyn ToolbarButtonExtension>)
            })
            .expect("plugin was registered");
    }

    /// Registers a ready-made plugin instance under its own metadata.
    pub(crate) fn add_plugin(&mut self, plugin: Arc<dyn TrimPlugin>) {
        let identity = PluginIdentity::new(
            plugin.plugin_id(),
            plugin.version(),
            plugin.minimum_host_version(),
        )
        .expect("valid identity");
        self.inner
            .register_plugin(identity, move || Ok(HostInstance::trim(Arc::clone(&plugin))));
    }

    /// Registers an id whose host object is not a TRiM plugin.
    pub(crate) fn add_foreign(&mut self, id: &str) {
        let identity = PluginIdentity::new(id, "0.1.0", "1.0.0").expect("valid identity");
        self.inner.register_plugin(identity, || {
            Ok(HostInstance::Foreign {
                type_name: "Visualiser",
            })
        });
    }

    /// Keeps `id` out of discovery until [`RecordingHost::reveal`].
    pub(crate) fn hide(&self, id: &str) {
        self.hidden
            .lock()
            .expect("hidden set mutex poisoned")
            .insert(id.to_owned());
    }

    pub(crate) fn reveal(&self, id: &str) {
        self.hidden
            .lock()
            .expect("hidden set mutex poisoned")
            .remove(id);
    }

    fn is_hidden(&self, id: &str) -> bool {
        self.hidden
            .lock()
            .expect("hidden set mutex poisoned")
            .contains(id)
    }
}

impl HostLoader for RecordingHost {
    fn discover(&self) -> Result<Vec<PluginIdentity>, HostError> {
        let identities = self.inner.discover()?;
        Ok(identities
            .into_iter()
            .filter(|identity| !self.is_hidden(identity.id()))
            .collect())
    }

    fn start(&self, id: &str) -> Result<(), HostError> {
        if self.is_hidden(id) {
            return Err(HostError::UnknownPlugin { id: id.to_owned() });
        }
        log_call(&self.log, format!("start:{id}"));
        self.inner.start(id)
    }

    fn stop(&self, id: &str) -> Result<(), HostError> {
        log_call(&self.log, format!("stop:{id}"));
        self.inner.stop(id)
    }

    fn state_of(&self, id: &str) -> Option<HostState> {
        if self.is_hidden(id) {
            return None;
        }
        self.inner.state_of(id)
    }

    fn instance_of(&self, id: &str) -> Option<HostInstance> {
        self.inner.instance_of(id)
    }

    fn extensions_of(&self, point: ExtensionPoint) -> Vec<Result<Extension, HostError>> {
        self.inner.extensions_of(point)
    }

    fn unload_all(&self) {
        log_call(&self.log, String::from("unload_all"));
        self.inner.unload_all();
    }
}
