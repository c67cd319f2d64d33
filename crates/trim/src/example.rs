//! Plugins bundled with the player.
//!
//! The example plugin shows the smallest useful shape of a TRiM plugin: it
//! embeds a [`PluginBase`], logs from its hooks, and contributes one toolbar
//! button.

use std::sync::Arc;

use tracing::info;
use trim_plugins::{
    HookError, HostInstance, PluginBase, PluginError, PluginIdentity, StaticHostLoader,
    ToolbarButtonExtension, TrimPlugin,
};

/// Identifier of the bundled example plugin.
pub const EXAMPLE_PLUGIN_ID: &str = "org.trim.example";

const EXAMPLE_VERSION: &str = "1.0.0";
const MINIMUM_HOST_VERSION: &str = "1.0.0";
const EXAMPLE_TARGET: &str = "trim::example";

/// Demonstration plugin that greets the listener.
#[derive(Debug, Clone)]
pub struct ExamplePlugin {
    base: PluginBase,
}

impl ExamplePlugin {
    /// Builds the plugin with its fixed metadata.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidPluginIdentity`] if the metadata is
    /// rejected.
    pub fn new() -> Result<Self, PluginError> {
        let base = PluginBase::new(
            EXAMPLE_PLUGIN_ID,
            "Example Plugin",
            EXAMPLE_VERSION,
            MINIMUM_HOST_VERSION,
        )?
        .with_description("Demonstrates the TRiM plugin system.");
        Ok(Self { base })
    }

    /// Returns a greeting for `name`.
    #[must_use]
    pub fn greet(&self, name: &str) -> String {
        format!("Hello, {name}! This is the {}.", self.base.display_name())
    }
}

impl TrimPlugin for ExamplePlugin {
    fn plugin_id(&self) -> &str {
        self.base.plugin_id()
    }

    fn display_name(&self) -> &str {
        self.base.display_name()
    }

    fn version(&self) -> &str {
        self.base.version()
    }

    fn minimum_host_version(&self) -> &str {
        self.base.minimum_host_version()
    }

    fn description(&self) -> &str {
        self.base.description()
    }

    fn on_load(&self) -> Result<(), HookError> {
        info!(target: EXAMPLE_TARGET, plugin = self.plugin_id(), "example plugin loaded");
        Ok(())
    }

    fn on_unload(&self) -> Result<(), HookError> {
        info!(target: EXAMPLE_TARGET, plugin = self.plugin_id(), "example plugin unloaded");
        Ok(())
    }
}

/// Toolbar button contributed by [`ExamplePlugin`].
#[derive(Debug)]
pub struct GreetingButton {
    greeting: String,
}

impl GreetingButton {
    fn new(plugin: &ExamplePlugin) -> Self {
        Self {
            greeting: plugin.greet("listener"),
        }
    }
}

impl ToolbarButtonExtension for GreetingButton {
    fn text(&self) -> &str {
        "Say Hello"
    }

    fn tooltip(&self) -> Option<&str> {
        Some("Greets the listener")
    }

    fn on_action(&self) {
        info!(target: EXAMPLE_TARGET, greeting = %self.greeting, "toolbar button pressed");
    }
}

/// Registers every bundled plugin with `host`.
///
/// # Errors
///
/// Returns [`PluginError::InvalidPluginIdentity`] for malformed metadata or
/// [`PluginError::Host`] when an extension cannot be registered.
pub fn register_builtin_plugins(host: &mut StaticHostLoader) -> Result<(), PluginError> {
    let identity = PluginIdentity::new(EXAMPLE_PLUGIN_ID, EXAMPLE_VERSION, MINIMUM_HOST_VERSION)?;
    host.register_plugin(identity, || {
        let plugin: Arc<dyn TrimPlugin> = Arc::new(ExamplePlugin::new()?);
        Ok(HostInstance::trim(plugin))
    });
    host.register_extension::<dyn ToolbarButtonExtension, _>(EXAMPLE_PLUGIN_ID, || {
        let plugin = ExamplePlugin::new()?;
        let button: Arc<dyn ToolbarButtonExtension> = Arc::new(GreetingButton::new(&plugin));
        Ok(button)
    })
    .map_err(|source| PluginError::Host {
        id: EXAMPLE_PLUGIN_ID.to_owned(),
        source,
    })?;
    Ok(())
}
