//! Mock channel for testing.

use crate::channel::{
    FeatureValue, LogicalMonitor, MonitorChannel, PhysicalHandle, PhysicalMonitor,
    PhysicalMonitors,
};
use crate::error::ChannelError;
use crate::vcp::VcpFeature;
use std::sync::{Arc, Mutex};

/// A fake monitor served by [`MockChannel`].
#[derive(Debug, Clone)]
pub struct MockMonitor {
    name: String,
    capabilities: Option<String>,
    brightness: Option<FeatureValue>,
    contrast: Option<FeatureValue>,
    fail_capabilities: bool,
    fail_get: bool,
    fail_set: bool,
}

impl MockMonitor {
    /// A monitor without brightness or contrast support.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: None,
            brightness: None,
            contrast: None,
            fail_capabilities: false,
            fail_get: false,
            fail_set: false,
        }
    }

    /// Support brightness with the given hardware values.
    pub fn brightness(mut self, current: u32, maximum: u32) -> Self {
        self.brightness = Some(FeatureValue { current, maximum });
        self
    }

    /// Support contrast with the given hardware values.
    pub fn contrast(mut self, current: u32, maximum: u32) -> Self {
        self.contrast = Some(FeatureValue { current, maximum });
        self
    }

    /// Report this capability string instead of a generated one.
    pub fn capabilities(mut self, text: impl Into<String>) -> Self {
        self.capabilities = Some(text.into());
        self
    }

    /// Fail every capability request.
    pub fn fail_capabilities(mut self) -> Self {
        self.fail_capabilities = true;
        self
    }

    /// Fail every feature read.
    pub fn fail_get(mut self) -> Self {
        self.fail_get = true;
        self
    }

    /// Fail every feature write.
    pub fn fail_set(mut self) -> Self {
        self.fail_set = true;
        self
    }

    fn capability_string(&self) -> String {
        if let Some(text) = &self.capabilities {
            return text.clone();
        }
        let mut codes = vec!["02", "04", "05", "08"];
        if self.brightness.is_some() {
            codes.push("10");
        }
        if self.contrast.is_some() {
            codes.push("12");
        }
        format!(
            "(prot(monitor)type(LCD)cmds(01 02 03 07 0C E3 F3)vcp({} 14(01 05 06 08 0B))mswhql(1)mccs_ver(2.2))",
            codes.join(" ")
        )
    }

    fn feature(&mut self, feature: VcpFeature) -> Option<&mut FeatureValue> {
        match feature {
            VcpFeature::Brightness => self.brightness.as_mut(),
            VcpFeature::Contrast => self.contrast.as_mut(),
        }
    }
}

/// A recorded [`MonitorChannel::set_feature`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockWrite {
    /// Target monitor.
    pub handle: PhysicalHandle,
    /// Written feature.
    pub feature: VcpFeature,
    /// Written value.
    pub value: u32,
}

#[derive(Debug, Default)]
struct MockState {
    logical: Vec<Vec<(PhysicalHandle, MockMonitor)>>,
    next_handle: isize,
    fail_enumeration: bool,
    writes: Vec<MockWrite>,
    released: Vec<PhysicalHandle>,
    release_calls: usize,
}

impl MockState {
    fn monitor(&mut self, handle: PhysicalHandle) -> Result<&mut MockMonitor, ChannelError> {
        self.logical
            .iter_mut()
            .flatten()
            .find(|(h, _)| *h == handle)
            .map(|(_, monitor)| monitor)
            .ok_or_else(|| ChannelError::Unavailable(format!("unknown handle {handle:?}")))
    }
}

/// A mock monitor channel for testing.
///
/// This allows testing [`MonitorControl`](crate::MonitorControl) without
/// DDC/CI hardware. Clones share state, so a test can keep a clone to inspect
/// writes after handing the channel to the controller.
///
/// # Example
///
/// ```
/// use monbright_core::{MockChannel, MockMonitor, MonitorControl, NeutralContrastSettings};
///
/// let channel = MockChannel::new().with_logical(vec![MockMonitor::new("A").brightness(10, 100)]);
/// let control = MonitorControl::new(channel.clone(), NeutralContrastSettings::new()).unwrap();
/// assert!(control.has_any_supported_monitors());
/// drop(control);
/// assert_eq!(channel.release_calls(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockChannel {
    state: Arc<Mutex<MockState>>,
}

impl MockChannel {
    /// Create a channel without any monitors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a logical monitor with the given physical monitors.
    pub fn with_logical(self, monitors: Vec<MockMonitor>) -> Self {
        self.connect(monitors);
        self
    }

    /// Make logical monitor enumeration fail.
    pub fn fail_enumeration(self) -> Self {
        self.state.lock().unwrap().fail_enumeration = true;
        self
    }

    /// Plug in a new logical monitor, returning the physical handles.
    pub fn connect(&self, monitors: Vec<MockMonitor>) -> Vec<PhysicalHandle> {
        let mut state = self.state.lock().unwrap();
        let mut entries = Vec::with_capacity(monitors.len());
        for monitor in monitors {
            state.next_handle += 1;
            entries.push((PhysicalHandle(state.next_handle), monitor));
        }
        let handles = entries.iter().map(|(handle, _)| *handle).collect();
        state.logical.push(entries);
        handles
    }

    /// Handles of all physical monitors, in enumeration order.
    pub fn handles(&self) -> Vec<PhysicalHandle> {
        let state = self.state.lock().unwrap();
        state.logical.iter().flatten().map(|(handle, _)| *handle).collect()
    }

    /// The value a monitor currently holds for a feature.
    pub fn value(&self, handle: PhysicalHandle, feature: VcpFeature) -> Option<u32> {
        let mut state = self.state.lock().unwrap();
        let monitor = state.monitor(handle).ok()?;
        monitor.feature(feature).map(|value| value.current)
    }

    /// Change a value behind the controller's back, like the monitor's own menu does.
    pub fn adjust(&self, handle: PhysicalHandle, feature: VcpFeature, current: u32) {
        let mut state = self.state.lock().unwrap();
        if let Ok(monitor) = state.monitor(handle) {
            if let Some(value) = monitor.feature(feature) {
                value.current = current;
            }
        }
    }

    /// Make every later feature read of a monitor fail, like a cable being pulled.
    pub fn fail_reads(&self, handle: PhysicalHandle) {
        let mut state = self.state.lock().unwrap();
        if let Ok(monitor) = state.monitor(handle) {
            monitor.fail_get = true;
        }
    }

    /// All successful writes so far.
    pub fn writes(&self) -> Vec<MockWrite> {
        self.state.lock().unwrap().writes.clone()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.state.lock().unwrap().writes.len()
    }

    /// Handles passed to [`MonitorChannel::release`].
    pub fn released(&self) -> Vec<PhysicalHandle> {
        self.state.lock().unwrap().released.clone()
    }

    /// Number of [`MonitorChannel::release`] calls.
    pub fn release_calls(&self) -> usize {
        self.state.lock().unwrap().release_calls
    }
}

impl MonitorChannel for MockChannel {
    fn logical_monitors(&self) -> Result<Vec<LogicalMonitor>, ChannelError> {
        let state = self.state.lock().unwrap();
        if state.fail_enumeration {
            return Err(ChannelError::Os {
                operation: "EnumDisplayMonitors",
                code: 5,
            });
        }
        Ok((0..state.logical.len())
            .map(|index| LogicalMonitor(index as isize))
            .collect())
    }

    fn physical_monitors(
        &self,
        logical: LogicalMonitor,
        limit: usize,
    ) -> Result<PhysicalMonitors, ChannelError> {
        let state = self.state.lock().unwrap();
        let entries = usize::try_from(logical.0)
            .ok()
            .and_then(|index| state.logical.get(index))
            .ok_or_else(|| ChannelError::Unavailable(format!("unknown {logical:?}")))?;
        Ok(PhysicalMonitors {
            monitors: entries
                .iter()
                .take(limit)
                .map(|(handle, monitor)| PhysicalMonitor {
                    handle: *handle,
                    description: monitor.name.clone(),
                })
                .collect(),
            available: entries.len(),
        })
    }

    fn capabilities(&self, monitor: PhysicalHandle) -> Result<String, ChannelError> {
        let mut state = self.state.lock().unwrap();
        let monitor = state.monitor(monitor)?;
        if monitor.fail_capabilities {
            return Err(ChannelError::Os {
                operation: "CapabilitiesRequestAndCapabilitiesReply",
                code: 31,
            });
        }
        Ok(monitor.capability_string())
    }

    fn get_feature(
        &self,
        monitor: PhysicalHandle,
        feature: VcpFeature,
    ) -> Result<FeatureValue, ChannelError> {
        let mut state = self.state.lock().unwrap();
        let monitor = state.monitor(monitor)?;
        if monitor.fail_get {
            return Err(ChannelError::Os {
                operation: "GetVCPFeatureAndVCPFeatureReply",
                code: 31,
            });
        }
        let name = monitor.name.clone();
        monitor
            .feature(feature)
            .copied()
            .ok_or_else(|| ChannelError::Unavailable(format!("{name} has no {feature}")))
    }

    fn set_feature(
        &self,
        monitor: PhysicalHandle,
        feature: VcpFeature,
        value: u32,
    ) -> Result<(), ChannelError> {
        let mut state = self.state.lock().unwrap();
        let handle = monitor;
        let monitor = state.monitor(handle)?;
        if monitor.fail_set {
            return Err(ChannelError::Os {
                operation: "SetVCPFeature",
                code: 31,
            });
        }
        let name = monitor.name.clone();
        let current = monitor
            .feature(feature)
            .ok_or_else(|| ChannelError::Unavailable(format!("{name} has no {feature}")))?;
        current.current = value;
        state.writes.push(MockWrite {
            handle,
            feature,
            value,
        });
        Ok(())
    }

    fn release(&self, monitors: &[PhysicalHandle]) {
        let mut state = self.state.lock().unwrap();
        state.released.extend_from_slice(monitors);
        state.release_calls += 1;
    }
}
