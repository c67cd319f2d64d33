//! Validated plugin identity.
//!
//! A [`PluginIdentity`] is supplied by plugin code and therefore treated as
//! untrusted input. Construction rejects blank fields so that nothing
//! downstream has to re-check them.

use std::fmt;

use crate::error::PluginError;

/// Immutable identity of a plugin: reverse-domain id, version, and the
/// minimum host version it was built against.
///
/// # Example
///
/// ```
/// use trim_plugins::PluginIdentity;
///
/// let identity = PluginIdentity::new("org.example.eq", "1.2.0", "1.0.0").expect("valid");
/// assert_eq!(identity.id(), "org.example.eq");
/// assert!(PluginIdentity::new("  ", "1.2.0", "1.0.0").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginIdentity {
    id: String,
    version: String,
    minimum_host_version: String,
}

impl PluginIdentity {
    /// Creates an identity after checking every field is non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidPluginIdentity`] naming the first blank
    /// field.
    pub fn new(
        id: impl Into<String>,
        version: impl Into<String>,
        minimum_host_version: impl Into<String>,
    ) -> Result<Self, PluginError> {
        let identity = Self {
            id: id.into(),
            version: version.into(),
            minimum_host_version: minimum_host_version.into(),
        };
        require_non_blank("plugin id", &identity.id)?;
        require_non_blank("version", &identity.version)?;
        require_non_blank("minimum host version", &identity.minimum_host_version)?;
        Ok(identity)
    }

    /// Returns the unique plugin identifier.
    #[must_use]
    pub const fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the plugin version.
    #[must_use]
    pub const fn version(&self) -> &str {
        self.version.as_str()
    }

    /// Returns the minimum host version the plugin requires.
    #[must_use]
    pub const fn minimum_host_version(&self) -> &str {
        self.minimum_host_version.as_str()
    }
}

impl fmt::Display for PluginIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.version)
    }
}

/// Fails with [`PluginError::InvalidPluginIdentity`] when `value` is blank.
pub(crate) fn require_non_blank(field: &str, value: &str) -> Result<(), PluginError> {
    if value.trim().is_empty() {
        return Err(PluginError::empty_field(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
