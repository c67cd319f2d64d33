//! Toolbar contributions.

/// A button a plugin adds to the player toolbar.
///
/// The GUI shell renders these; the plugin subsystem only collects them from
/// started plugins.
pub trait ToolbarButtonExtension: Send + Sync {
    /// Button label. May be empty when the shell renders an icon instead.
    fn text(&self) -> &str;

    /// Tooltip shown on hover.
    fn tooltip(&self) -> Option<&str> {
        None
    }

    /// Inline style applied to the button.
    fn style(&self) -> Option<&str> {
        None
    }

    /// Whether the button starts disabled.
    fn initially_disabled(&self) -> bool {
        false
    }

    /// Invoked on the UI thread when the button is pressed.
    fn on_action(&self);
}
