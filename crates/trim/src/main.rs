//! Command-line entrypoint for the TRiM plugin manager.
//!
//! The binary delegates to [`trim::run`], which loads configuration, boots the
//! plugin subsystem, runs one command, and shuts the subsystem down again.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    trim::run(std::env::args_os(), &mut stdout, &mut stderr)
}
