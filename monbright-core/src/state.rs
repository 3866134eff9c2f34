//! Controller state snapshot.

use crate::monitor::MonitorRecord;

/// A snapshot of the controller's current state.
///
/// Use [`MonitorControl::get_state`](crate::MonitorControl::get_state) to obtain a snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerState {
    /// Logical brightness in `[0, 1]`.
    pub brightness: f64,
    /// Logical contrast, 1.0 being every monitor's neutral contrast.
    pub contrast: f64,
    /// Upper end of the useful contrast range.
    pub max_contrast: f64,
    /// Copies of all monitor records in probe order.
    pub monitors: Vec<MonitorRecord>,
}
