//! Extension points contributed by started plugins.
//!
//! An [`ExtensionPoint`] identifies an application-defined capability type by
//! its [`TypeId`]. Hosts wrap each contribution in an [`Extension`], which
//! holds an `Arc<T>` behind `dyn Any` so trait-object capabilities such as
//! `dyn ToolbarButtonExtension` can be recovered with a single downcast.

mod toolbar;

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

pub use self::toolbar::ToolbarButtonExtension;

/// Identifies a capability type that plugins may contribute.
///
/// # Example
///
/// ```
/// use trim_plugins::{ExtensionPoint, ToolbarButtonExtension};
///
/// let point = ExtensionPoint::of::<dyn ToolbarButtonExtension>();
/// assert!(point.name().contains("ToolbarButtonExtension"));
/// assert_eq!(point, ExtensionPoint::of::<dyn ToolbarButtonExtension>());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtensionPoint {
    type_id: TypeId,
    name: &'static str,
}

impl ExtensionPoint {
    /// Returns the extension point for capability type `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Returns the type identifier of the capability.
    #[must_use]
    pub const fn type_id(self) -> TypeId {
        self.type_id
    }

    /// Returns the capability type name, for diagnostics only.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }
}

impl fmt::Display for ExtensionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A capability object contributed by one plugin.
#[derive(Clone)]
pub struct Extension {
    plugin_id: String,
    point: ExtensionPoint,
    value: Arc<dyn Any + Send + Sync>,
}

impl Extension {
    /// Wraps `value` as a contribution to the extension point of `T`.
    #[must_use]
    pub fn new<T>(plugin_id: impl Into<String>, value: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self {
            plugin_id: plugin_id.into(),
            point: ExtensionPoint::of::<T>(),
            value: Arc::new(value),
        }
    }

    /// Identifier of the contributing plugin.
    #[must_use]
    pub const fn plugin_id(&self) -> &str {
        self.plugin_id.as_str()
    }

    /// Extension point the contribution was registered against.
    #[must_use]
    pub const fn point(&self) -> ExtensionPoint {
        self.point
    }

    /// Recovers the capability object when it was registered as `T`.
    #[must_use]
    pub fn downcast<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.value.downcast_ref::<Arc<T>>().cloned()
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension")
            .field("plugin_id", &self.plugin_id)
            .field("point", &self.point)
            .finish_non_exhaustive()
    }
}
