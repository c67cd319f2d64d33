//! Capability contract satisfied by every TRiM plugin instance.
//!
//! The host loader hands the orchestrator a [`HostInstance`]. The variant
//! check and the identity validation happen once, in [`verify`], before any
//! hook runs. Every later call works with the resulting
//! [`ActiveInstance`](crate::ActiveInstance) and never re-inspects the object.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use thiserror::Error;

use crate::error::PluginError;
use crate::host::HostInstance;
use crate::identity::{PluginIdentity, require_non_blank};
use crate::orchestrator::ActiveInstance;

/// Description reported by plugins that do not provide one.
pub const DEFAULT_DESCRIPTION: &str = "No description available.";

// ---------------------------------------------------------------------------
// TrimPlugin
// ---------------------------------------------------------------------------

/// Operations every plugin instance exposes to the player.
///
/// Hooks take `&self` because the orchestrator shares instances with
/// extension queries; plugins that keep state across hooks use interior
/// mutability.
///
/// # Example
///
/// ```
/// use trim_plugins::{HookError, TrimPlugin};
///
/// struct Scrobbler;
///
/// impl TrimPlugin for Scrobbler {
///     fn plugin_id(&self) -> &str { "org.example.scrobbler" }
///     fn display_name(&self) -> &str { "Scrobbler" }
///     fn version(&self) -> &str { "0.3.0" }
///     fn minimum_host_version(&self) -> &str { "1.0.0" }
///
///     fn on_load(&self) -> Result<(), HookError> {
///         Err(HookError::new("no network"))
///     }
/// }
///
/// assert_eq!(Scrobbler.description(), trim_plugins::DEFAULT_DESCRIPTION);
/// ```
pub trait TrimPlugin: Send + Sync {
    /// Unique reverse-domain identifier, e.g. `org.example.scrobbler`.
    fn plugin_id(&self) -> &str;

    /// Human-readable name.
    fn display_name(&self) -> &str;

    /// Plugin version.
    fn version(&self) -> &str;

    /// Minimum player version the plugin is compatible with.
    fn minimum_host_version(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str {
        DEFAULT_DESCRIPTION
    }

    /// Called once the plugin is host-started and about to become active.
    ///
    /// # Errors
    ///
    /// Returning an error leaves the plugin failed; it never becomes active.
    fn on_load(&self) -> Result<(), HookError> {
        Ok(())
    }

    /// Called before the host stops the plugin.
    ///
    /// # Errors
    ///
    /// Errors are logged; the plugin is deactivated regardless.
    fn on_unload(&self) -> Result<(), HookError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Hooks
// ---------------------------------------------------------------------------

/// Application-level lifecycle hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// [`TrimPlugin::on_load`].
    Load,
    /// [`TrimPlugin::on_unload`].
    Unload,
}

impl Hook {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Unload => "unload",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a plugin hook.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HookError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HookError {
    /// Builds an error without an underlying source.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Builds an error that wraps an underlying source.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Human-readable message describing the failure.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }

    fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|text| (*text).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| String::from("non-string panic payload"));
        Self::new(format!("hook panicked: {detail}"))
    }
}

/// Runs `hook` on `plugin`, converting a panic into a [`HookError`].
pub(crate) fn invoke_hook(plugin: &dyn TrimPlugin, hook: Hook) -> Result<(), HookError> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| match hook {
        Hook::Load => plugin.on_load(),
        Hook::Unload => plugin.on_unload(),
    }));
    match outcome {
        Ok(result) => result,
        Err(payload) => Err(HookError::from_panic(payload.as_ref())),
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Checks that `instance` is a TRiM plugin with a well-formed identity
/// matching the id the host reported.
///
/// # Errors
///
/// Returns [`PluginError::ContractNotSatisfied`] for foreign objects or id
/// mismatches, and [`PluginError::InvalidPluginIdentity`] for blank metadata.
pub(crate) fn verify(host_id: &str, instance: HostInstance) -> Result<ActiveInstance, PluginError> {
    let plugin = match instance {
        HostInstance::Trim(plugin) => plugin,
        HostInstance::Foreign { type_name } => {
            return Err(PluginError::ContractNotSatisfied {
                id: host_id.to_owned(),
                message: format!("host object of type '{type_name}' is not a TRiM plugin"),
            });
        }
    };

    let identity = PluginIdentity::new(
        plugin.plugin_id(),
        plugin.version(),
        plugin.minimum_host_version(),
    )?;
    require_non_blank("display name", plugin.display_name())?;

    if identity.id() != host_id {
        return Err(PluginError::ContractNotSatisfied {
            id: host_id.to_owned(),
            message: format!("instance reports id '{}'", identity.id()),
        });
    }

    Ok(ActiveInstance::new(identity, plugin))
}

// ---------------------------------------------------------------------------
// PluginBase
// ---------------------------------------------------------------------------

/// Validated metadata with no-op hooks.
///
/// Plugins that only contribute extensions can hand a `PluginBase` to the
/// host directly; others embed one and forward the metadata accessors.
///
/// # Example
///
/// ```
/// use trim_plugins::{PluginBase, TrimPlugin};
///
/// let base = PluginBase::new("org.example.eq", "Equaliser", "1.0.0", "1.0.0")
///     .expect("valid")
///     .with_description("Ten band graphic equaliser.");
/// assert_eq!(base.display_name(), "Equaliser");
/// assert!(PluginBase::new("org.example.eq", "", "1.0.0", "1.0.0").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginBase {
    identity: PluginIdentity,
    display_name: String,
    description: Option<String>,
}

impl PluginBase {
    /// Creates validated plugin metadata.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidPluginIdentity`] if any field is blank.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        version: impl Into<String>,
        minimum_host_version: impl Into<String>,
    ) -> Result<Self, PluginError> {
        let identity = PluginIdentity::new(id, version, minimum_host_version)?;
        let display_name = display_name.into();
        require_non_blank("display name", &display_name)?;
        Ok(Self {
            identity,
            display_name,
            description: None,
        })
    }

    /// Attaches a human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the validated identity.
    #[must_use]
    pub const fn identity(&self) -> &PluginIdentity {
        &self.identity
    }

    /// Wraps the metadata as a shareable plugin handle.
    #[must_use]
    pub fn into_handle(self) -> Arc<dyn TrimPlugin> {
        Arc::new(self)
    }
}

impl TrimPlugin for PluginBase {
    fn plugin_id(&self) -> &str {
        self.identity.id()
    }

    fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    fn version(&self) -> &str {
        self.identity.version()
    }

    fn minimum_host_version(&self) -> &str {
        self.identity.minimum_host_version()
    }

    fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION)
    }
}

impl fmt::Display for PluginBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (ID: {}, Version: {})",
            self.display_name,
            self.identity.id(),
            self.identity.version()
        )
    }
}
