use std::env;

use camino::Utf8PathBuf;

/// Directory name used beneath the platform configuration root.
const APP_DIR_NAME: &str = "TRiM";

/// File name of the enablement document inside the application directory.
pub const ENABLEMENT_FILE_NAME: &str = "config.json";

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}

/// Computes the default application directory.
///
/// Windows resolves to `%APPDATA%\TRiM`; other platforms use
/// `~/.config/TRiM`. When neither root can be determined the directory
/// falls back to the system temporary directory.
#[must_use]
pub fn default_app_dir() -> Utf8PathBuf {
    let mut base = platform_base_directory().unwrap_or_else(fallback_base_directory);
    base.push(APP_DIR_NAME);
    base
}

#[cfg(windows)]
fn platform_base_directory() -> Option<Utf8PathBuf> {
    dirs::data_dir().and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
}

#[cfg(not(windows))]
fn platform_base_directory() -> Option<Utf8PathBuf> {
    dirs::home_dir()
        .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
        .map(|home| home.join(".config"))
}

fn fallback_base_directory() -> Utf8PathBuf {
    let candidate = env::temp_dir();
    Utf8PathBuf::from_path_buf(candidate).unwrap_or_else(|_| Utf8PathBuf::from("/tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_app_dir_ends_with_application_name() {
        assert_eq!(default_app_dir().file_name(), Some(APP_DIR_NAME));
    }
}
