//! Composition root for the plugin subsystem.

use std::sync::Arc;

use trim_config::{AppPaths, Config};
use trim_plugins::{
    EnablementStore, LifecycleReporter, Orchestrator, StaticHostLoader,
    StructuredLifecycleReporter,
};

use crate::AppError;
use crate::example::register_builtin_plugins;
use crate::telemetry::{self, TelemetryHandle};

/// A running plugin subsystem bound to one configuration.
///
/// Plugins are initialised by [`Player::start`] and shut down when the
/// player is dropped, tying plugin lifetime to the process.
pub struct Player {
    config: Config,
    paths: AppPaths,
    orchestrator: Orchestrator<StaticHostLoader>,
    telemetry: TelemetryHandle,
}

impl Player {
    /// Boots the plugin subsystem with the default structured reporter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when telemetry, the application directories, or
    /// plugin registration cannot be prepared.
    pub fn start(config: Config) -> Result<Self, AppError> {
        Self::start_with(config, Arc::new(StructuredLifecycleReporter::new()))
    }

    /// Boots the plugin subsystem, reporting lifecycle events to `reporter`.
    ///
    /// # Errors
    ///
    /// See [`Player::start`].
    pub fn start_with(
        config: Config,
        reporter: Arc<dyn LifecycleReporter>,
    ) -> Result<Self, AppError> {
        let telemetry = telemetry::initialise(&config).map_err(AppError::Telemetry)?;
        let paths = AppPaths::from_config(&config).map_err(AppError::Paths)?;

        let mut host = StaticHostLoader::new();
        register_builtin_plugins(&mut host).map_err(AppError::Registration)?;

        let store = EnablementStore::open(paths.enablement_file().as_std_path());
        let orchestrator = Orchestrator::new(host, store).with_reporter(reporter);
        orchestrator.initialize();

        Ok(Self {
            config,
            paths,
            orchestrator,
            telemetry,
        })
    }

    /// Resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Application paths derived from the configuration.
    #[must_use]
    pub const fn paths(&self) -> &AppPaths {
        &self.paths
    }

    /// Orchestrator driving the bundled plugins.
    #[must_use]
    pub const fn orchestrator(&self) -> &Orchestrator<StaticHostLoader> {
        &self.orchestrator
    }

    /// Telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.orchestrator.shutdown();
    }
}
