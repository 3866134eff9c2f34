//! The monitor control channel.
//!
//! The controller never talks to the operating system directly. Everything it
//! needs from DDC/CI goes through [`MonitorChannel`], which lets tests swap in
//! [`MockChannel`](crate::MockChannel).

use crate::error::ChannelError;
use crate::vcp::VcpFeature;

/// Opaque handle of a logical (desktop) monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogicalMonitor(pub isize);

/// Opaque handle of a physical monitor.
///
/// Handles are acquired by [`MonitorChannel::physical_monitors`] and must be
/// handed back to [`MonitorChannel::release`] exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhysicalHandle(pub isize);

/// A physical monitor as reported by the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalMonitor {
    /// Handle used for all further I/O.
    pub handle: PhysicalHandle,
    /// Display-supplied description. Not guaranteed to be unique.
    pub description: String,
}

/// Physical monitors behind one logical monitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhysicalMonitors {
    /// The acquired monitors, at most the requested limit.
    pub monitors: Vec<PhysicalMonitor>,
    /// How many physical monitors the logical monitor actually has.
    pub available: usize,
}

impl PhysicalMonitors {
    /// Number of monitors that were not acquired because of the limit.
    pub fn truncated(&self) -> usize {
        self.available.saturating_sub(self.monitors.len())
    }
}

/// Current and maximum value of a VCP feature, in hardware units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureValue {
    /// The value the monitor currently uses.
    pub current: u32,
    /// The largest value the monitor accepts.
    pub maximum: u32,
}

/// Low-level access to DDC/CI monitors.
///
/// Implementations perform no retries; timeouts are their own business.
pub trait MonitorChannel: Send {
    /// List the logical display monitors.
    fn logical_monitors(&self) -> Result<Vec<LogicalMonitor>, ChannelError>;

    /// Acquire up to `limit` physical monitor handles of a logical monitor.
    fn physical_monitors(
        &self,
        logical: LogicalMonitor,
        limit: usize,
    ) -> Result<PhysicalMonitors, ChannelError>;

    /// Fetch the raw capability string of a monitor.
    fn capabilities(&self, monitor: PhysicalHandle) -> Result<String, ChannelError>;

    /// Read the current and maximum value of a feature.
    fn get_feature(
        &self,
        monitor: PhysicalHandle,
        feature: VcpFeature,
    ) -> Result<FeatureValue, ChannelError>;

    /// Write a new value for a feature.
    fn set_feature(
        &self,
        monitor: PhysicalHandle,
        feature: VcpFeature,
        value: u32,
    ) -> Result<(), ChannelError>;

    /// Release previously acquired physical monitor handles.
    fn release(&self, monitors: &[PhysicalHandle]);
}
