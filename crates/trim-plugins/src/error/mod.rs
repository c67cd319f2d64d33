//! Domain errors raised by plugin lifecycle operations.
//!
//! All errors use a `thiserror`-derived enum with structured context so the
//! orchestrator and reporters can inspect failures programmatically. I/O
//! errors are wrapped in `Arc` to satisfy the `result_large_err` Clippy lint
//! and to keep the error cheap to clone into status snapshots.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::contract::{Hook, HookError};
use crate::host::HostError;

/// Errors arising from plugin lifecycle operations.
///
/// Only [`PluginError::InvalidPluginIdentity`] escapes to callers, from
/// constructors. The orchestrator records every other variant as a failure
/// status and a log entry instead of returning it.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Plugin metadata was empty or malformed.
    #[error("invalid plugin identity: {message}")]
    InvalidPluginIdentity {
        /// Description of the offending field.
        message: String,
    },

    /// The host handed back an object that is not a TRiM plugin.
    #[error("plugin '{id}' does not satisfy the capability contract: {message}")]
    ContractNotSatisfied {
        /// Identifier the host reported.
        id: String,
        /// Description of the mismatch.
        message: String,
    },

    /// A load or unload hook reported an error or panicked.
    #[error("{hook} hook of plugin '{id}' failed: {source}")]
    HookFailure {
        /// Plugin identifier.
        id: String,
        /// Hook that failed.
        hook: Hook,
        /// Failure reported by the plugin.
        #[source]
        source: HookError,
    },

    /// The host loader refused a lifecycle request.
    #[error("host loader failed for plugin '{id}': {source}")]
    Host {
        /// Plugin identifier.
        id: String,
        /// Underlying host error.
        #[source]
        source: HostError,
    },

    /// The enablement file could not be written.
    #[error("failed to persist enablement file '{}': {source}", path.display())]
    Persistence {
        /// Location of the enablement file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// A lookup named an id the host loader has never discovered.
    #[error("plugin '{id}' is unknown to the host loader")]
    UnknownPluginId {
        /// Identifier that was looked up.
        id: String,
    },
}

impl PluginError {
    /// Builds an identity error describing an empty field.
    #[must_use]
    pub fn empty_field(field: &str) -> Self {
        Self::InvalidPluginIdentity {
            message: format!("{field} must not be empty"),
        }
    }
}
