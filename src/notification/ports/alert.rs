//! Port for operating-system desktop notifications.

/// Whether the user allowed desktop notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertPermission {
    /// Not asked yet.
    #[default]
    Default,
    /// Alerts may be shown.
    Granted,
    /// The user refused.
    Denied,
}

/// Desktop alert surface.
pub trait DesktopAlerter: Send + Sync {
    /// Returns the current permission.
    fn permission(&self) -> AlertPermission;

    /// Shows an alert; only called when permission is granted.
    fn show(&self, title: &str, body: &str);
}

/// Alerter that never shows anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAlerter;

impl DesktopAlerter for SilentAlerter {
    fn permission(&self) -> AlertPermission {
        AlertPermission::Denied
    }

    fn show(&self, _title: &str, _body: &str) {}
}
