//! Per-monitor records.

/// Stable identifier of a monitor inside a [`MonitorControl`](crate::MonitorControl).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonitorId(pub(crate) usize);

/// Hardware range of a brightness-capable monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureRange {
    /// Last value known to be on the monitor.
    pub current: u32,
    /// Native maximum.
    pub max: u32,
}

/// Hardware range of a contrast-capable monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContrastRange {
    /// Last value known to be on the monitor.
    pub current: u32,
    /// Native maximum.
    pub max: u32,
    /// The value treated as 100% contrast. Always in `[1, max]` (or 1 when
    /// `max` is zero).
    pub neutral: u32,
}

/// Everything known about one physical monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorRecord {
    /// Identifier within the controller.
    pub id: MonitorId,
    /// Display-supplied description.
    pub name: String,
    /// MCCS version from the capability string, empty if unknown.
    pub protocol_version: String,
    /// Present only if the monitor supports brightness.
    pub brightness: Option<FeatureRange>,
    /// Present only if the monitor supports contrast.
    pub contrast: Option<ContrastRange>,
}

impl MonitorRecord {
    pub(crate) fn new(id: MonitorId, name: String) -> Self {
        Self {
            id,
            name,
            protocol_version: String::new(),
            brightness: None,
            contrast: None,
        }
    }

    /// Whether brightness can be controlled.
    pub fn supports_brightness(&self) -> bool {
        self.brightness.is_some()
    }

    /// Whether contrast can be controlled.
    pub fn supports_contrast(&self) -> bool {
        self.contrast.is_some()
    }
}
