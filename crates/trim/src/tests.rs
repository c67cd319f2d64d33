//! End-to-end tests for the CLI runtime.

use std::ffi::OsString;
use std::fs;

use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use tempfile::TempDir;
use trim_config::{Config, LogFormat};

use super::*;

struct StaticConfigLoader {
    config: Config,
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

struct Workspace {
    dir: TempDir,
    loader: StaticConfigLoader,
}

impl Workspace {
    fn enablement_file(&self) -> Utf8PathBuf {
        self.loader.config.enablement_file()
    }

    fn invoke(&self, args: &[&str]) -> (ExitCode, String, String) {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let exit = run_with_loader(
            args.iter().map(OsString::from),
            &mut stdout,
            &mut stderr,
            &self.loader,
        );
        (
            exit,
            String::from_utf8(stdout).expect("stdout is UTF-8"),
            String::from_utf8(stderr).expect("stderr is UTF-8"),
        )
    }
}

#[fixture]
fn workspace() -> Workspace {
    let dir = TempDir::new().expect("temp dir");
    let app_dir =
        Utf8PathBuf::from_path_buf(dir.path().join("TRiM")).expect("temp dir is UTF-8");
    let config = Config {
        app_dir,
        enablement_file: None,
        log_filter: String::from("off"),
        log_format: LogFormat::Compact,
    };
    Workspace {
        dir,
        loader: StaticConfigLoader { config },
    }
}

#[rstest]
fn list_reports_the_bundled_plugin_loaded(workspace: Workspace) {
    let (exit, stdout, stderr) = workspace.invoke(&["trim", "list"]);
    assert_eq!(exit, ExitCode::SUCCESS, "stderr: {stderr}");
    assert_eq!(
        stdout,
        "org.trim.example\tenabled\tloaded\tExample Plugin\n"
    );
    assert!(workspace.enablement_file().is_file());
}

#[rstest]
fn disable_persists_across_runs(workspace: Workspace) {
    let (exit, stdout, _) = workspace.invoke(&["trim", "disable", EXAMPLE_PLUGIN_ID]);
    assert_eq!(exit, ExitCode::SUCCESS);
    assert_eq!(
        stdout,
        "org.trim.example\tdisabled\tunloaded\torg.trim.example\n"
    );

    let (_, listed, _) = workspace.invoke(&["trim", "list"]);
    assert!(listed.starts_with("org.trim.example\tdisabled\tunloaded"));

    let document = fs::read_to_string(workspace.enablement_file()).expect("enablement file");
    assert!(document.contains("\"enabled\": false"));
}

#[rstest]
fn enable_restores_a_disabled_plugin(workspace: Workspace) {
    workspace.invoke(&["trim", "disable", EXAMPLE_PLUGIN_ID]);
    let (exit, stdout, _) = workspace.invoke(&["trim", "enable", EXAMPLE_PLUGIN_ID]);
    assert_eq!(exit, ExitCode::SUCCESS);
    assert_eq!(
        stdout,
        "org.trim.example\tenabled\tloaded\tExample Plugin\n"
    );
}

#[rstest]
fn policy_for_missing_plugin_is_stored(workspace: Workspace) {
    let (exit, stdout, _) = workspace.invoke(&["trim", "disable", "org.example.missing"]);
    assert_eq!(exit, ExitCode::SUCCESS);
    assert_eq!(
        stdout,
        "org.example.missing\tdisabled\tnot installed; policy stored\n"
    );

    let (_, listed, _) = workspace.invoke(&["trim", "list"]);
    assert!(listed.contains("org.example.missing\tdisabled\tnot installed\n"));
}

#[rstest]
fn toolbar_follows_enablement(workspace: Workspace) {
    let (exit, stdout, _) = workspace.invoke(&["trim", "toolbar"]);
    assert_eq!(exit, ExitCode::SUCCESS);
    assert_eq!(stdout, "Say Hello\tGreets the listener\n");

    workspace.invoke(&["trim", "disable", EXAMPLE_PLUGIN_ID]);
    let (_, after, _) = workspace.invoke(&["trim", "toolbar"]);
    assert!(after.is_empty());
}

#[rstest]
fn missing_command_is_a_usage_error(workspace: Workspace) {
    let (exit, stdout, stderr) = workspace.invoke(&["trim"]);
    assert_eq!(exit, ExitCode::FAILURE);
    assert!(stdout.is_empty());
    assert!(stderr.contains("Usage"));
}

#[rstest]
fn help_goes_to_stdout(workspace: Workspace) {
    let (exit, stdout, stderr) = workspace.invoke(&["trim", "--help"]);
    assert_eq!(exit, ExitCode::SUCCESS);
    assert!(stdout.contains("toolbar"));
    assert!(stderr.is_empty());
}

#[rstest]
fn unwritable_app_dir_fails(workspace: Workspace) {
    let blocker = workspace.dir.path().join("blocker");
    fs::write(&blocker, b"not a directory").expect("write blocker");
    let loader = StaticConfigLoader {
        config: Config {
            app_dir: Utf8PathBuf::from_path_buf(blocker.join("TRiM")).expect("UTF-8 path"),
            ..workspace.loader.config.clone()
        },
    };

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = run_with_loader(
        ["trim", "list"].map(OsString::from),
        &mut stdout,
        &mut stderr,
        &loader,
    );
    assert_eq!(exit, ExitCode::FAILURE);
    assert!(
        String::from_utf8_lossy(&stderr).contains("failed to prepare directory"),
        "unexpected stderr"
    );
}

#[test]
fn ortho_loader_rejects_unknown_log_format() {
    let args: Vec<OsString> = ["trim", "--log-format", "xml"]
        .map(OsString::from)
        .to_vec();
    let error = OrthoConfigLoader
        .load(&args)
        .expect_err("xml is not a log format");
    assert!(matches!(error, AppError::LoadConfiguration(_)));
}
