//! Structured reporting for plugin lifecycle events.

use std::sync::Arc;

use crate::error::PluginError;
use crate::extension::ExtensionPoint;
use crate::host::HostError;
use crate::orchestrator::ActiveInstance;

/// Tracing target for lifecycle events.
pub const LIFECYCLE_TARGET: &str = "trim_plugins::lifecycle";

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait LifecycleReporter: Send + Sync {
    /// Invoked before plugin discovery begins.
    fn initialize_started(&self);

    /// Invoked after every discovered plugin has been processed.
    fn initialize_completed(&self, discovered: usize, active: usize);

    /// Invoked when discovery fails as a whole.
    fn discovery_failed(&self, error: &HostError);

    /// Invoked after a plugin's load hook succeeds.
    fn plugin_loaded(&self, instance: &ActiveInstance);

    /// Invoked after a plugin has been removed from the active set.
    fn plugin_unloaded(&self, id: &str);

    /// Invoked when a lifecycle step fails for one plugin.
    fn plugin_failed(&self, id: &str, error: &PluginError);

    /// Invoked when policy is recorded for an id the host does not know.
    fn policy_deferred(&self, id: &str, enabled: bool);

    /// Invoked when the enablement file cannot be written.
    fn persistence_failed(&self, error: &PluginError);

    /// Invoked when a contribution to an extension point is dropped.
    fn extension_skipped(&self, point: ExtensionPoint, error: &HostError);

    /// Invoked after shutdown has torn down every plugin.
    fn shutdown_completed(&self);
}

impl<T> LifecycleReporter for Arc<T>
where
    T: LifecycleReporter + ?Sized,
{
    fn initialize_started(&self) {
        (**self).initialize_started();
    }

    fn initialize_completed(&self, discovered: usize, active: usize) {
        (**self).initialize_completed(discovered, active);
    }

    fn discovery_failed(&self, error: &HostError) {
        (**self).discovery_failed(error);
    }

    fn plugin_loaded(&self, instance: &ActiveInstance) {
        (**self).plugin_loaded(instance);
    }

    fn plugin_unloaded(&self, id: &str) {
        (**self).plugin_unloaded(id);
    }

    fn plugin_failed(&self, id: &str, error: &PluginError) {
        (**self).plugin_failed(id, error);
    }

    fn policy_deferred(&self, id: &str, enabled: bool) {
        (**self).policy_deferred(id, enabled);
    }

    fn persistence_failed(&self, error: &PluginError) {
        (**self).persistence_failed(error);
    }

    fn extension_skipped(&self, point: ExtensionPoint, error: &HostError) {
        (**self).extension_skipped(point, error);
    }

    fn shutdown_completed(&self) {
        (**self).shutdown_completed();
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredLifecycleReporter;

impl StructuredLifecycleReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LifecycleReporter for StructuredLifecycleReporter {
    fn initialize_started(&self) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "initialize_started",
            "discovering plugins"
        );
    }

    fn initialize_completed(&self, discovered: usize, active: usize) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "initialize_completed",
            discovered,
            active,
            "plugin initialization completed"
        );
    }

    fn discovery_failed(&self, error: &HostError) {
        tracing::error!(
            target: LIFECYCLE_TARGET,
            event = "discovery_failed",
            error = %error,
            "plugin discovery failed"
        );
    }

    fn plugin_loaded(&self, instance: &ActiveInstance) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "plugin_loaded",
            plugin = instance.id(),
            name = instance.display_name(),
            version = instance.identity().version(),
            "plugin loaded"
        );
    }

    fn plugin_unloaded(&self, id: &str) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "plugin_unloaded",
            plugin = id,
            "plugin unloaded"
        );
    }

    fn plugin_failed(&self, id: &str, error: &PluginError) {
        tracing::error!(
            target: LIFECYCLE_TARGET,
            event = "plugin_failed",
            plugin = id,
            error = %error,
            "plugin lifecycle step failed"
        );
    }

    fn policy_deferred(&self, id: &str, enabled: bool) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "policy_deferred",
            plugin = id,
            enabled,
            "plugin not discovered; policy stored for later"
        );
    }

    fn persistence_failed(&self, error: &PluginError) {
        tracing::warn!(
            target: LIFECYCLE_TARGET,
            event = "persistence_failed",
            error = %error,
            "enablement state not persisted"
        );
    }

    fn extension_skipped(&self, point: ExtensionPoint, error: &HostError) {
        tracing::warn!(
            target: LIFECYCLE_TARGET,
            event = "extension_skipped",
            point = point.name(),
            error = %error,
            "skipping faulty extension"
        );
    }

    fn shutdown_completed(&self) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "shutdown_completed",
            "plugin subsystem shut down"
        );
    }
}
