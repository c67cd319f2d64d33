//! Command-line grammar for the `trim` binary.

use clap::{Parser, Subcommand};

/// Manages the plugins bundled with the TRiM player.
#[derive(Parser, Debug)]
#[command(name = "trim", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Command to run once the plugin subsystem is up.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Plugin management commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Lists discovered plugins with their policy and state.
    List,
    /// Enables a plugin and loads it if installed.
    Enable {
        /// Plugin identifier, for example `org.trim.example`.
        id: String,
    },
    /// Disables a plugin, unloading it if loaded.
    Disable {
        /// Plugin identifier.
        id: String,
    },
    /// Lists toolbar buttons contributed by loaded plugins.
    Toolbar,
}
