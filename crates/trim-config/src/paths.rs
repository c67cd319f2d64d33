//! Derives the on-disk locations used by the player.
//!
//! The application directory houses the enablement file written by the
//! plugin subsystem. Both the directory and the parent of the enablement file
//! are created eagerly so the store can always write a fresh document.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::Config;

/// Canonical paths for application artefacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    app_dir: Utf8PathBuf,
    enablement_file: Utf8PathBuf,
}

impl AppPaths {
    /// Derives application paths from the shared configuration and ensures
    /// the directories exist.
    ///
    /// # Errors
    ///
    /// Returns [`AppPathsError::Directory`] when a directory cannot be
    /// created, or [`AppPathsError::MissingParent`] when the enablement file
    /// has no parent component.
    pub fn from_config(config: &Config) -> Result<Self, AppPathsError> {
        let app_dir = config.app_dir().to_path_buf();
        create_directory(&app_dir)?;

        let enablement_file = config.enablement_file();
        let parent = enablement_file
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .ok_or_else(|| AppPathsError::MissingParent {
                path: enablement_file.to_string(),
            })?;
        create_directory(parent)?;

        Ok(Self {
            app_dir,
            enablement_file,
        })
    }

    /// Directory holding application state.
    #[must_use]
    pub fn app_dir(&self) -> &Utf8Path {
        self.app_dir.as_path()
    }

    /// Path to the enablement document.
    #[must_use]
    pub fn enablement_file(&self) -> &Utf8Path {
        self.enablement_file.as_path()
    }
}

fn create_directory(path: &Utf8Path) -> Result<(), AppPathsError> {
    fs::create_dir_all(path).map_err(|source| AppPathsError::Directory {
        path: path.to_path_buf(),
        source,
    })
}

/// Errors raised while deriving application paths.
#[derive(Debug, Error)]
pub enum AppPathsError {
    /// The enablement file path lacked a parent directory.
    #[error("enablement file '{path}' has no parent directory")]
    MissingParent {
        /// Offending path.
        path: String,
    },
    /// Creating a directory failed.
    #[error("failed to prepare directory '{path}': {source}")]
    Directory {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("temp dir is UTF-8")
    }

    #[test]
    fn creates_app_dir_and_derives_enablement_file() {
        let temp = TempDir::new().expect("temp dir");
        let config = Config {
            app_dir: utf8(&temp).join("TRiM"),
            ..Config::default()
        };
        let paths = AppPaths::from_config(&config).expect("paths should derive");
        assert!(paths.app_dir().is_dir());
        assert!(paths.enablement_file().ends_with("config.json"));
    }

    #[test]
    fn creates_parent_of_explicit_enablement_file() {
        let temp = TempDir::new().expect("temp dir");
        let config = Config {
            app_dir: utf8(&temp).join("app"),
            enablement_file: Some(utf8(&temp).join("state/plugins.json")),
            ..Config::default()
        };
        let paths = AppPaths::from_config(&config).expect("paths should derive");
        assert!(utf8(&temp).join("state").is_dir());
        assert!(paths.enablement_file().ends_with("plugins.json"));
    }

    #[test]
    fn rejects_enablement_file_without_parent() {
        let temp = TempDir::new().expect("temp dir");
        let config = Config {
            app_dir: utf8(&temp),
            enablement_file: Some(Utf8PathBuf::from("plugins.json")),
            ..Config::default()
        };
        let error = AppPaths::from_config(&config).expect_err("relative bare file has no parent");
        assert!(matches!(error, AppPathsError::MissingParent { .. }));
    }
}
