//! Harness owning a temporary enablement file, a recording host, and the
//! orchestrator under test.

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rstest::fixture;
use tempfile::TempDir;

use crate::contract::TrimPlugin;
use crate::orchestrator::Orchestrator;
use crate::store::EnablementStore;

use super::{Behaviour, CallLog, RecordingHost, RecordingReporter};

/// Scenario world shared across steps and unit tests.
pub(crate) struct TestWorld {
    dir: TempDir,
    pub(crate) log: CallLog,
    pub(crate) reporter: Arc<RecordingReporter>,
    host: Option<RecordingHost>,
    orchestrator: Option<Orchestrator<RecordingHost>>,
}

impl TestWorld {
    pub(crate) fn new() -> Self {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        Self {
            dir: TempDir::new().expect("temp dir"),
            host: Some(RecordingHost::new(Arc::clone(&log))),
            log,
            reporter: Arc::new(RecordingReporter::default()),
            orchestrator: None,
        }
    }

    pub(crate) fn enablement_path(&self) -> PathBuf {
        self.dir.path().join("config.json")
    }

    /// Registers a probe plugin. Must precede [`TestWorld::orchestrator`].
    pub(crate) fn add_probe(&mut self, id: &str, load: Behaviour, unload: Behaviour) {
        self.host_mut().add_probe(id, load, unload);
    }

    pub(crate) fn add_plugin(&mut self, plugin: Arc<dyn TrimPlugin>) {
        self.host_mut().add_plugin(plugin);
    }

    pub(crate) fn add_foreign(&mut self, id: &str) {
        self.host_mut().add_foreign(id);
    }

    pub(crate) fn hide(&mut self, id: &str) {
        self.host_mut().hide(id);
    }

    /// Makes a hidden id discoverable, building the orchestrator if needed.
    pub(crate) fn reveal(&mut self, id: &str) {
        self.orchestrator().host().reveal(id);
    }

    /// Returns the orchestrator, building it on first use.
    pub(crate) fn orchestrator(&mut self) -> &Orchestrator<RecordingHost> {
        if self.orchestrator.is_none() {
            let host = self.host.take().expect("host is available before build");
            let store = EnablementStore::open(self.enablement_path());
            self.orchestrator =
                Some(Orchestrator::new(host, store).with_reporter(self.reporter.clone()));
        }
        self.orchestrator.as_ref().expect("orchestrator was built")
    }

    /// Opens a second store over the same enablement file.
    pub(crate) fn reopen_store(&self) -> EnablementStore {
        EnablementStore::open(self.enablement_path())
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.log.lock().expect("call log mutex poisoned").clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.log.lock().expect("call log mutex poisoned").clear();
    }

    fn host_mut(&mut self) -> &mut RecordingHost {
        self.host
            .as_mut()
            .expect("plugins must be registered before the orchestrator is built")
    }
}

/// Fixture providing a fresh world.
#[fixture]
pub(crate) fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}
