//! Test double for [`LifecycleReporter`] that records events for assertions.

use std::sync::Mutex;

use crate::error::PluginError;
use crate::extension::ExtensionPoint;
use crate::host::HostError;
use crate::orchestrator::ActiveInstance;
use crate::reporter::LifecycleReporter;

/// Lifecycle events captured during a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LifecycleEvent {
    InitializeStarted,
    InitializeCompleted { discovered: usize, active: usize },
    DiscoveryFailed(String),
    Loaded(String),
    Unloaded(String),
    Failed { id: String, message: String },
    PolicyDeferred { id: String, enabled: bool },
    PersistenceFailed,
    ExtensionSkipped(String),
    ShutdownCompleted,
}

/// Records lifecycle events for assertions.
#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl RecordingReporter {
    pub(crate) fn events(&self) -> Vec<LifecycleEvent> {
        self.events
            .lock()
            .expect("reporter mutex poisoned")
            .clone()
    }

    pub(crate) fn failures_for(&self, id: &str) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, LifecycleEvent::Failed { id: failed, .. } if failed == id))
            .count()
    }

    fn record(&self, event: LifecycleEvent) {
        self.events
            .lock()
            .expect("reporter mutex poisoned")
            .push(event);
    }
}

impl LifecycleReporter for RecordingReporter {
    fn initialize_started(&self) {
        self.record(LifecycleEvent::InitializeStarted);
    }

    fn initialize_completed(&self, discovered: usize, active: usize) {
        self.record(LifecycleEvent::InitializeCompleted { discovered, active });
    }

    fn discovery_failed(&self, error: &HostError) {
        self.record(LifecycleEvent::DiscoveryFailed(error.to_string()));
    }

    fn plugin_loaded(&self, instance: &ActiveInstance) {
        self.record(LifecycleEvent::Loaded(instance.id().to_owned()));
    }

    fn plugin_unloaded(&self, id: &str) {
        self.record(LifecycleEvent::Unloaded(id.to_owned()));
    }

    fn plugin_failed(&self, id: &str, error: &PluginError) {
        self.record(LifecycleEvent::Failed {
            id: id.to_owned(),
            message: error.to_string(),
        });
    }

    fn policy_deferred(&self, id: &str, enabled: bool) {
        self.record(LifecycleEvent::PolicyDeferred {
            id: id.to_owned(),
            enabled,
        });
    }

    fn persistence_failed(&self, _error: &PluginError) {
        self.record(LifecycleEvent::PersistenceFailed);
    }

    fn extension_skipped(&self, _point: ExtensionPoint, error: &HostError) {
        self.record(LifecycleEvent::ExtensionSkipped(error.to_string()));
    }

    fn shutdown_completed(&self) {
        self.record(LifecycleEvent::ShutdownCompleted);
    }
}
