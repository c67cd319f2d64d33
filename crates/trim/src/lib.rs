//! Runtime for the `trim` plugin manager.
//!
//! The binary boots the plugin subsystem of the TRiM player for the duration
//! of one command: configuration is layered by `ortho_config`, telemetry is
//! installed, the bundled plugins are registered with an in-process host,
//! and an [`trim_plugins::Orchestrator`] reconciles them with the persisted
//! enablement policy. The subsystem is shut down again before the process
//! exits.
//!
//! IO streams and the configuration loader are injected so the runtime can be
//! exercised from tests without touching the process environment.

use std::ffi::OsString;
use std::fmt::Display;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing::warn;

mod bootstrap;
mod cli;
mod commands;
mod config;
mod errors;
mod example;
pub mod telemetry;

pub use bootstrap::Player;
use cli::Cli;
use config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};
pub use errors::AppError;
pub use example::{EXAMPLE_PLUGIN_ID, ExamplePlugin, GreetingButton, register_builtin_plugins};
pub use telemetry::{TelemetryError, TelemetryHandle};

/// Tracing target for the CLI runtime.
const CLI_TARGET: &str = "trim::cli";

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let arguments: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&arguments);

    let result = Cli::try_parse_from(split.command_arguments.iter())
        .map_err(AppError::CliUsage)
        .and_then(|cli| {
            loader
                .load(&split.config_arguments)
                .map(|config| (cli, config))
        })
        .and_then(|(cli, config)| {
            let player = Player::start(config)?;
            commands::execute(&cli.command, player.orchestrator(), stdout)
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::CliUsage(error)) if !error.use_stderr() => {
            emit(stdout, &error.render());
            ExitCode::SUCCESS
        }
        Err(error) => {
            emit(stderr, &error);
            ExitCode::FAILURE
        }
    }
}

fn emit<S: Write>(stream: &mut S, message: &dyn Display) {
    if let Err(error) = writeln!(stream, "{message}") {
        warn!(target: CLI_TARGET, %error, "failed to write CLI output");
    }
}

#[cfg(test)]
mod tests;
