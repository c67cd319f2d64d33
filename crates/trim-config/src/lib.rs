//! Shared configuration for the TRiM player and its plugin subsystem.
//!
//! Configuration is layered by `ortho_config`: built-in defaults, then an
//! optional configuration file, then `TRIM_*` environment variables, then
//! command-line flags. The resolved [`Config`] names the application
//! directory, the enablement file that records per-plugin policy, and the
//! telemetry settings consumed by the `trim` binary.

mod defaults;
mod logging;
mod paths;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, ENABLEMENT_FILE_NAME, default_app_dir, default_log_filter,
    default_log_filter_string, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use paths::{AppPaths, AppPathsError};

/// Resolved configuration shared by the binary and the plugin subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "TRIM")]
pub struct Config {
    /// Directory holding application state such as the enablement file.
    #[serde(default = "defaults::default_app_dir")]
    pub app_dir: Utf8PathBuf,
    /// Explicit location of the enablement file. Defaults to
    /// `<app_dir>/config.json` when unset.
    #[serde(default)]
    pub enablement_file: Option<Utf8PathBuf>,
    /// `tracing` filter expression applied to the global subscriber.
    #[serde(default = "defaults::default_log_filter_string")]
    pub log_filter: String,
    /// Output format for structured logs.
    #[serde(default = "defaults::default_log_format")]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_dir: default_app_dir(),
            enablement_file: None,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Directory holding application state.
    #[must_use]
    pub fn app_dir(&self) -> &camino::Utf8Path {
        self.app_dir.as_path()
    }

    /// Location of the enablement file after applying the default.
    #[must_use]
    pub fn enablement_file(&self) -> Utf8PathBuf {
        self.enablement_file
            .clone()
            .unwrap_or_else(|| self.app_dir.join(ENABLEMENT_FILE_NAME))
    }

    /// Filter expression for the tracing subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Structured log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
