//! DDC/CI access through the Windows monitor configuration API.

use crate::channel::{
    FeatureValue, LogicalMonitor, MonitorChannel, PhysicalHandle, PhysicalMonitor,
    PhysicalMonitors,
};
use crate::error::ChannelError;
use crate::vcp::VcpFeature;

use log::{trace, warn};
use windows_sys::Win32::{
    Devices::Display::{
        CapabilitiesRequestAndCapabilitiesReply, DestroyPhysicalMonitor,
        GetCapabilitiesStringLength, GetNumberOfPhysicalMonitorsFromHMONITOR,
        GetPhysicalMonitorsFromHMONITOR, GetVCPFeatureAndVCPFeatureReply, MC_VCP_CODE_TYPE,
        PHYSICAL_MONITOR, SetVCPFeature,
    },
    Foundation::{GetLastError, HANDLE, LPARAM, RECT},
    Graphics::Gdi::{EnumDisplayMonitors, HDC, HMONITOR},
};
use windows_sys::core::BOOL;

/// The real DDC/CI channel.
///
/// Stateless: handles are owned by whoever acquired them, in practice
/// [`MonitorControl`](crate::MonitorControl), which releases them on drop.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Channel;

impl Win32Channel {
    /// Create a new channel.
    pub fn new() -> Self {
        Self
    }
}

fn last_error(operation: &'static str) -> ChannelError {
    let code = unsafe { GetLastError() };
    ChannelError::Os { operation, code }
}

fn raw(handle: PhysicalHandle) -> HANDLE {
    handle.0 as HANDLE
}

impl MonitorChannel for Win32Channel {
    fn logical_monitors(&self) -> Result<Vec<LogicalMonitor>, ChannelError> {
        unsafe extern "system" fn enum_proc(
            monitor: HMONITOR,
            _hdc: HDC,
            _rect: *mut RECT,
            data: LPARAM,
        ) -> BOOL {
            let monitors = unsafe { &mut *(data as *mut Vec<LogicalMonitor>) };
            monitors.push(LogicalMonitor(monitor as isize));
            1
        }

        let mut monitors: Vec<LogicalMonitor> = Vec::new();
        let ok = unsafe {
            EnumDisplayMonitors(
                std::ptr::null_mut(),
                std::ptr::null(),
                Some(enum_proc),
                &mut monitors as *mut Vec<LogicalMonitor> as LPARAM,
            )
        };
        if ok == 0 {
            return Err(last_error("EnumDisplayMonitors"));
        }
        trace!("enumerated {} logical monitor(s)", monitors.len());
        Ok(monitors)
    }

    fn physical_monitors(
        &self,
        logical: LogicalMonitor,
        limit: usize,
    ) -> Result<PhysicalMonitors, ChannelError> {
        let hmonitor = logical.0 as HMONITOR;

        let mut count = 0u32;
        if unsafe { GetNumberOfPhysicalMonitorsFromHMONITOR(hmonitor, &mut count) } == 0 {
            return Err(last_error("GetNumberOfPhysicalMonitorsFromHMONITOR"));
        }

        let available = count as usize;
        let wanted = available.min(limit);
        if wanted == 0 {
            return Ok(PhysicalMonitors {
                monitors: Vec::new(),
                available,
            });
        }

        let mut raw_monitors: Vec<PHYSICAL_MONITOR> = vec![unsafe { std::mem::zeroed() }; wanted];
        let ok = unsafe {
            GetPhysicalMonitorsFromHMONITOR(hmonitor, wanted as u32, raw_monitors.as_mut_ptr())
        };
        if ok == 0 {
            return Err(last_error("GetPhysicalMonitorsFromHMONITOR"));
        }

        let monitors = raw_monitors
            .iter()
            .map(|monitor| {
                let description = &monitor.szPhysicalMonitorDescription;
                let len = description.iter().take_while(|&&c| c != 0).count();
                PhysicalMonitor {
                    handle: PhysicalHandle(monitor.hPhysicalMonitor as isize),
                    description: String::from_utf16_lossy(&description[..len]),
                }
            })
            .collect();

        Ok(PhysicalMonitors {
            monitors,
            available,
        })
    }

    fn capabilities(&self, monitor: PhysicalHandle) -> Result<String, ChannelError> {
        let mut len = 0u32;
        if unsafe { GetCapabilitiesStringLength(raw(monitor), &mut len) } == 0 {
            return Err(last_error("GetCapabilitiesStringLength"));
        }

        let mut buffer = vec![0u8; len as usize];
        let ok = unsafe {
            CapabilitiesRequestAndCapabilitiesReply(raw(monitor), buffer.as_mut_ptr(), len)
        };
        if ok == 0 {
            return Err(last_error("CapabilitiesRequestAndCapabilitiesReply"));
        }

        let end = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
        Ok(String::from_utf8_lossy(&buffer[..end]).into_owned())
    }

    fn get_feature(
        &self,
        monitor: PhysicalHandle,
        feature: VcpFeature,
    ) -> Result<FeatureValue, ChannelError> {
        let mut kind: MC_VCP_CODE_TYPE = 0;
        let mut current = 0u32;
        let mut maximum = 0u32;
        let ok = unsafe {
            GetVCPFeatureAndVCPFeatureReply(
                raw(monitor),
                feature.code(),
                &mut kind,
                &mut current,
                &mut maximum,
            )
        };
        if ok == 0 {
            return Err(last_error("GetVCPFeatureAndVCPFeatureReply"));
        }
        Ok(FeatureValue { current, maximum })
    }

    fn set_feature(
        &self,
        monitor: PhysicalHandle,
        feature: VcpFeature,
        value: u32,
    ) -> Result<(), ChannelError> {
        if unsafe { SetVCPFeature(raw(monitor), feature.code(), value) } == 0 {
            return Err(last_error("SetVCPFeature"));
        }
        Ok(())
    }

    fn release(&self, monitors: &[PhysicalHandle]) {
        for &monitor in monitors {
            if unsafe { DestroyPhysicalMonitor(raw(monitor)) } == 0 {
                warn!("{}", last_error("DestroyPhysicalMonitor"));
            }
        }
    }
}
