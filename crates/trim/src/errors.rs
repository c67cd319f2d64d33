//! Error type for the CLI runtime.

use std::io;
use std::sync::Arc;

use thiserror::Error;
use trim_config::AppPathsError;
use trim_plugins::PluginError;

use crate::telemetry::TelemetryError;

/// Failures surfaced by the `trim` binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration layering failed.
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    /// Command-line arguments were rejected, or help was requested.
    #[error("{0}")]
    CliUsage(clap::Error),
    /// The tracing subscriber could not be installed.
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(TelemetryError),
    /// Application directories could not be prepared.
    #[error(transparent)]
    Paths(AppPathsError),
    /// Bundled plugins could not be registered.
    #[error("failed to register bundled plugins: {0}")]
    Registration(PluginError),
    /// A plugin query failed.
    #[error(transparent)]
    Plugins(PluginError),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    Write(io::Error),
    /// The requested transition left the plugin failed.
    #[error("plugin '{id}' failed: {source}")]
    PluginFailed {
        /// Plugin identifier.
        id: String,
        /// Recorded failure.
        source: Arc<PluginError>,
    },
}
