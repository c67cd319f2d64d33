//! Shared test harness and behavioural suites for the plugin subsystem.

pub(crate) mod support;
