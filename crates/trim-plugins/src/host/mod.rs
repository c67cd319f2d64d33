//! Seam to the plugin-hosting framework.
//!
//! The host loader owns plugin code: it discovers candidates, instantiates
//! them, and starts or stops them by id. Its *started* state is independent
//! of the orchestrator's application-level *loaded* state. The orchestrator
//! consumes the host only through [`HostLoader`], so tests can substitute
//! recording or failing hosts.

mod static_loader;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::contract::TrimPlugin;
use crate::extension::{Extension, ExtensionPoint};
use crate::identity::PluginIdentity;

pub use self::static_loader::StaticHostLoader;

/// Host-level plugin state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostState {
    /// Discovered but never started.
    Discovered,
    /// Started; the instance and its extensions are available.
    Started,
    /// Previously started, now stopped.
    Stopped,
}

impl HostState {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Started => "started",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for HostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Object the host hands back for a started plugin.
///
/// Hosts that load arbitrary plugin code cannot guarantee the object
/// implements [`TrimPlugin`]; they report such objects as
/// [`HostInstance::Foreign`] and the orchestrator refuses to load them.
#[derive(Clone)]
pub enum HostInstance {
    /// An object satisfying the TRiM capability contract.
    Trim(Arc<dyn TrimPlugin>),
    /// An object of some other type.
    Foreign {
        /// Type name reported by the host, for diagnostics.
        type_name: &'static str,
    },
}

impl HostInstance {
    /// Wraps a TRiM plugin handle.
    #[must_use]
    pub const fn trim(plugin: Arc<dyn TrimPlugin>) -> Self {
        Self::Trim(plugin)
    }
}

impl fmt::Debug for HostInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trim(plugin) => f.debug_tuple("Trim").field(&plugin.plugin_id()).finish(),
            Self::Foreign { type_name } => f
                .debug_struct("Foreign")
                .field("type_name", type_name)
                .finish(),
        }
    }
}

/// Errors reported by a host loader.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The id is not among the discovered plugins.
    #[error("plugin '{id}' is not known to the host")]
    UnknownPlugin {
        /// Identifier that was requested.
        id: String,
    },
    /// The plugin could not be instantiated or started.
    #[error("plugin '{id}' failed to start: {message}")]
    StartFailed {
        /// Plugin identifier.
        id: String,
        /// Description of the failure.
        message: String,
    },
    /// The plugin could not be stopped.
    #[error("plugin '{id}' failed to stop: {message}")]
    StopFailed {
        /// Plugin identifier.
        id: String,
        /// Description of the failure.
        message: String,
    },
    /// The host reports the plugin started but has no instance for it.
    #[error("plugin '{id}' is started but has no instance")]
    MissingInstance {
        /// Plugin identifier.
        id: String,
    },
    /// An extension object could not be constructed.
    #[error("extension {point} from plugin '{id}' could not be constructed: {message}")]
    ExtensionFailed {
        /// Contributing plugin.
        id: String,
        /// Extension point name.
        point: String,
        /// Description of the failure.
        message: String,
    },
    /// Plugin discovery failed as a whole.
    #[error("plugin discovery failed: {message}")]
    Discovery {
        /// Description of the failure.
        message: String,
    },
}

/// Operations the orchestrator needs from a plugin-hosting framework.
///
/// Implementations must be safe to call from several threads; the
/// orchestrator serialises calls for the same id but not across ids.
pub trait HostLoader: Send + Sync {
    /// Enumerates every plugin the host can load.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Discovery`] when enumeration fails as a whole.
    fn discover(&self) -> Result<Vec<PluginIdentity>, HostError>;

    /// Starts a discovered plugin.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::UnknownPlugin`] or [`HostError::StartFailed`].
    fn start(&self, id: &str) -> Result<(), HostError>;

    /// Stops a started plugin.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::UnknownPlugin`] or [`HostError::StopFailed`].
    fn stop(&self, id: &str) -> Result<(), HostError>;

    /// Reports the host state of `id`, or `None` when the id is unknown.
    fn state_of(&self, id: &str) -> Option<HostState>;

    /// Returns the running object for `id` if it is started.
    fn instance_of(&self, id: &str) -> Option<HostInstance>;

    /// Collects contributions to `point` from every started plugin. Each
    /// contribution is constructed independently, so one failure does not
    /// hide the others.
    fn extensions_of(&self, point: ExtensionPoint) -> Vec<Result<Extension, HostError>>;

    /// Forgets every discovered plugin. The next [`HostLoader::discover`]
    /// starts from scratch.
    fn unload_all(&self);
}

impl<T> HostLoader for Arc<T>
where
    T: HostLoader + ?Sized,
{
    fn discover(&self) -> Result<Vec<PluginIdentity>, HostError> {
        (**self).discover()
    }

    fn start(&self, id: &str) -> Result<(), HostError> {
        (**self).start(id)
    }

    fn stop(&self, id: &str) -> Result<(), HostError> {
        (**self).stop(id)
    }

    fn state_of(&self, id: &str) -> Option<HostState> {
        (**self).state_of(id)
    }

    fn instance_of(&self, id: &str) -> Option<HostInstance> {
        (**self).instance_of(id)
    }

    fn extensions_of(&self, point: ExtensionPoint) -> Vec<Result<Extension, HostError>> {
        (**self).extensions_of(point)
    }

    fn unload_all(&self) {
        (**self).unload_all();
    }
}
