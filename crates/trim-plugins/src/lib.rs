//! Plugin lifecycle orchestration for the TRiM audio player.
//!
//! The `trim-plugins` crate reconciles a persisted per-plugin enablement
//! policy with the runtime state of plugins owned by an in-process host
//! loader. Two state machines are kept apart on purpose: the host loader
//! decides whether plugin code is *started*, while the [`Orchestrator`]
//! decides whether the application-level load hook has run and the plugin is
//! *loaded*.
//!
//! # Architecture
//!
//! - [`EnablementStore`] persists `{enabled, version, settings}` per plugin
//!   id as a JSON document and defaults unknown ids to enabled.
//! - [`HostLoader`] is the seam to the hosting framework. [`StaticHostLoader`]
//!   is the in-process implementation used for plugins compiled into the
//!   player.
//! - [`TrimPlugin`] is the capability contract every plugin instance
//!   satisfies. Instances are verified once, when the host hands them over.
//! - [`Orchestrator`] drives the host according to policy, invokes the load
//!   and unload hooks, isolates per-plugin failures, and answers extension
//!   queries such as toolbar contributions.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use trim_plugins::{
//!     EnablementStore, HostInstance, Orchestrator, PluginBase, PluginIdentity,
//!     StaticHostLoader,
//! };
//!
//! let dir = tempfile::tempdir().expect("temp dir");
//! let store = EnablementStore::open(dir.path().join("config.json"));
//!
//! let identity = PluginIdentity::new("org.example.echo", "1.0.0", "1.0.0").expect("valid");
//! let mut host = StaticHostLoader::new();
//! host.register_plugin(identity, || {
//!     let plugin = PluginBase::new("org.example.echo", "Echo", "1.0.0", "1.0.0")?;
//!     Ok(HostInstance::trim(Arc::new(plugin)))
//! });
//!
//! let orchestrator = Orchestrator::new(host, store);
//! orchestrator.initialize();
//! assert!(orchestrator.get_plugin("org.example.echo").is_some());
//!
//! orchestrator.set_enabled("org.example.echo", false);
//! assert!(orchestrator.get_plugin("org.example.echo").is_none());
//! orchestrator.shutdown();
//! ```

pub mod contract;
pub mod error;
pub mod extension;
pub mod host;
pub mod identity;
pub mod orchestrator;
pub mod reporter;
pub mod store;
mod sync;

#[cfg(test)]
mod tests;

pub use self::contract::{DEFAULT_DESCRIPTION, Hook, HookError, PluginBase, TrimPlugin};
pub use self::error::PluginError;
pub use self::extension::{Extension, ExtensionPoint, ToolbarButtonExtension};
pub use self::host::{HostError, HostInstance, HostLoader, HostState, StaticHostLoader};
pub use self::identity::PluginIdentity;
pub use self::orchestrator::{ActiveInstance, LifecycleState, Orchestrator, PluginListing};
pub use self::reporter::{LifecycleReporter, StructuredLifecycleReporter};
pub use self::store::{EnablementRecord, EnablementStore};
