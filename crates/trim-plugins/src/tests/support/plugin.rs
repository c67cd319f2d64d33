//! Plugin double whose hooks can succeed, fail, or panic on demand.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::contract::{HookError, PluginBase, TrimPlugin};

use super::CallLog;

/// How a probe hook behaves when invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Behaviour {
    /// Returns `Ok`.
    Succeed,
    /// Returns a [`HookError`].
    Fail,
    /// Returns a [`HookError`] the first time only.
    FailOnce,
    /// Panics.
    Panic,
}

/// Plugin that logs `load:<id>` and `unload:<id>` into a shared call log.
pub(crate) struct Probe {
    base: PluginBase,
    log: CallLog,
    load: Behaviour,
    unload: Behaviour,
    failed_once: AtomicBool,
}

impl Probe {
    pub(crate) fn new(id: &str, log: CallLog, load: Behaviour, unload: Behaviour) -> Self {
        let base = PluginBase::new(id, format!("Probe {id}"), "1.4.0", "1.0.0")
            .expect("probe metadata is valid")
            .with_description("Records hook calls.");
        Self {
            base,
            log,
            load,
            unload,
            failed_once: AtomicBool::new(false),
        }
    }

    fn run(&self, hook: &str, behaviour: Behaviour) -> Result<(), HookError> {
        log_call(&self.log, format!("{hook}:{}", self.base.plugin_id()));
        match behaviour {
            Behaviour::Succeed => Ok(()),
            Behaviour::Fail => Err(HookError::new(format!("{hook} refused"))),
            Behaviour::FailOnce => {
                if self.failed_once.swap(true, Ordering::SeqCst) {
                    Ok(())
                } else {
                    Err(HookError::new(format!("{hook} refused once")))
                }
            }
            Behaviour::Panic => panic!("{hook} hook exploded"),
        }
    }
}

impl TrimPlugin for Probe {
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
        self.run("load", self.load)
    }

    fn on_unload(&self) -> Result<(), HookError> {
        self.run("unload", self.unload)
    }
}

pub(crate) fn log_call(log: &CallLog, entry: String) {
    log.lock().expect("call log mutex poisoned").push(entry);
}
