//! Separates configuration flags from command tokens.
//!
//! Flags listed in [`CONFIG_CLI_FLAGS`] must precede the subcommand. They are
//! handed to `ortho_config`; everything from the first other token onwards is
//! parsed by `clap`.

use std::ffi::{OsStr, OsString};

use ortho_config::OrthoConfig;
use trim_config::Config;

use crate::AppError;

/// CLI flags recognised by the configuration loader.
///
/// Keep in sync with the fields of [`trim_config::Config`].
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--app-dir",
    "--enablement-file",
    "--log-filter",
    "--log-format",
];

/// Loads configuration for the CLI.
pub(crate) trait ConfigLoader {
    /// Loads configuration from the program name and configuration flags.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

/// Loader backed by `ortho_config` layering.
pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    if !text.starts_with("--") {
        return FlagAction::Skip;
    }
    let (flag, has_inline_value) = text
        .split_once('=')
        .map_or((text.as_ref(), false), |(flag, _)| (flag, true));
    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !has_inline_value,
        }
    } else {
        FlagAction::Skip
    }
}

/// Arguments split into the configuration prefix and the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConfigArgumentSplit {
    /// Program name followed by configuration flags and their values.
    pub(crate) config_arguments: Vec<OsString>,
    /// Program name followed by the command tokens.
    pub(crate) command_arguments: Vec<OsString>,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let program: Vec<OsString> = args.first().cloned().into_iter().collect();
    let mut config_arguments = program.clone();
    let mut command_start = program.len();
    let mut pending_value = false;

    for argument in args.iter().skip(1) {
        if pending_value {
            pending_value = false;
        } else {
            match classify(argument) {
                FlagAction::Include { needs_value } => pending_value = needs_value,
                FlagAction::Skip => break,
            }
        }
        config_arguments.push(argument.clone());
        command_start += 1;
    }

    let command_arguments = program
        .into_iter()
        .chain(args.iter().skip(command_start).cloned())
        .collect();
    ConfigArgumentSplit {
        config_arguments,
        command_arguments,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[rstest]
    #[case::inline("--log-filter=debug", FlagAction::Include { needs_value: false })]
    #[case::separate("--log-filter", FlagAction::Include { needs_value: true })]
    #[case::command("list", FlagAction::Skip)]
    #[case::unknown("--verbose", FlagAction::Skip)]
    fn classifies_flags(#[case] argument: &str, #[case] expected: FlagAction) {
        assert_eq!(classify(OsStr::new(argument)), expected);
    }

    #[test]
    fn splits_leading_configuration_flags() {
        let split = split_config_arguments(&os_args(&[
            "trim",
            "--log-format",
            "compact",
            "--app-dir=/tmp/trim",
            "disable",
            "org.trim.example",
        ]));
        assert_eq!(
            split.config_arguments,
            os_args(&["trim", "--log-format", "compact", "--app-dir=/tmp/trim"])
        );
        assert_eq!(
            split.command_arguments,
            os_args(&["trim", "disable", "org.trim.example"])
        );
    }

    #[test]
    fn flags_after_the_command_belong_to_the_command() {
        let split = split_config_arguments(&os_args(&["trim", "list", "--log-filter", "debug"]));
        assert_eq!(split.config_arguments, os_args(&["trim"]));
        assert_eq!(
            split.command_arguments,
            os_args(&["trim", "list", "--log-filter", "debug"])
        );
    }

    #[test]
    fn empty_arguments_split_to_nothing() {
        let split = split_config_arguments(&[]);
        assert!(split.config_arguments.is_empty());
        assert!(split.command_arguments.is_empty());
    }
}
