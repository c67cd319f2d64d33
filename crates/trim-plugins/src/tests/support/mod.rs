//! Test doubles shared by the orchestrator unit tests and the behavioural
//! suite.

mod host;
mod plugin;
mod reporter;
mod test_world;

pub(crate) use host::{CallLog, RecordingHost};
pub(crate) use plugin::Behaviour;
pub(crate) use reporter::{LifecycleEvent, RecordingReporter};
pub(crate) use test_world::{TestWorld, world};
