//! Brightness and contrast control for every attached monitor over DDC/CI.
//!
//! This crate turns one normalized brightness value and one normalized
//! contrast value into the native register values of each connected monitor.
//!
//! - [`Capabilities`] parses the capability string a monitor reports and finds
//!   out whether it supports brightness (VCP `0x10`) and contrast (VCP `0x12`).
//! - [`MonitorControl`] probes all monitors, keeps their hardware ranges and
//!   maps logical levels onto them, writing only values that changed.
//! - [`NeutralContrastSettings`] holds the user's calibrated "neutral"
//!   contrast per monitor, which is what a logical contrast of 1.0 maps to.
//!
//! All hardware access goes through the [`MonitorChannel`] trait.
//! [`Win32Channel`] implements it on Windows.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(windows)]
//! # fn main() -> Result<(), monbright_core::ControllerError> {
//! use monbright_core::{MonitorControl, NeutralContrastSettings, Win32Channel};
//!
//! let mut control = MonitorControl::new(Win32Channel::new(), NeutralContrastSettings::new())?;
//!
//! if !control.has_any_supported_monitors() {
//!     println!("no controllable monitors found");
//!     return Ok(());
//! }
//!
//! control.set_brightness(0.75)?;
//! control.set_contrast(control.max_contrast().min(1.2))?;
//! # Ok(())
//! # }
//! # #[cfg(not(windows))]
//! # fn main() {}
//! ```
//!
//! # Testing
//!
//! Use [`MockChannel`] to test code without hardware:
//!
//! ```
//! use monbright_core::{MockChannel, MockMonitor, MonitorControl, NeutralContrastSettings};
//!
//! let channel = MockChannel::new().with_logical(vec![MockMonitor::new("A").brightness(0, 100)]);
//! let mut control = MonitorControl::new(channel, NeutralContrastSettings::new()).unwrap();
//! control.set_brightness(0.3).unwrap();
//! assert_eq!(control.brightness(), 0.3);
//! ```

#![warn(missing_docs)]

mod capabilities;
mod channel;
mod controller;
mod error;
mod mock;
mod monitor;
mod probe;
mod settings;
mod state;
mod vcp;
#[cfg(windows)]
mod win32;

// Re-export public API
pub use capabilities::Capabilities;
pub use channel::{
    FeatureValue, LogicalMonitor, MonitorChannel, PhysicalHandle, PhysicalMonitor,
    PhysicalMonitors,
};
pub use controller::{ControlConfig, MAX_CONTRAST_RATIO, MAX_PHYSICAL_MONITORS, MonitorControl};
pub use error::{CapabilityError, ChannelError, ControllerError, FeatureFailure};
pub use mock::{MockChannel, MockMonitor, MockWrite};
pub use monitor::{ContrastRange, FeatureRange, MonitorId, MonitorRecord};
pub use probe::ProbeReport;
pub use settings::NeutralContrastSettings;
pub use state::ControllerState;
pub use vcp::VcpFeature;
#[cfg(windows)]
pub use win32::Win32Channel;

#[cfg(test)]
mod tests {
    use super::*;

    fn two_monitors() -> MockChannel {
        MockChannel::new().with_logical(vec![
            MockMonitor::new("A").brightness(30, 100).contrast(50, 100),
            MockMonitor::new("B").brightness(7, 50).contrast(80, 80),
        ])
    }

    #[test]
    fn test_set_brightness_scales_each_monitor() {
        let mut control = MonitorControl::new(two_monitors(), NeutralContrastSettings::new()).unwrap();

        for level in [0.0, 0.13, 0.5, 0.77, 1.0] {
            control.set_brightness(level).unwrap();
            for monitor in control.monitor_list() {
                let range = monitor.brightness.unwrap();
                assert_eq!(range.current, (level * f64::from(range.max)).round() as u32);
                assert!(range.current <= range.max);
            }
            assert_eq!(control.brightness(), level);
        }
    }

    #[test]
    fn test_set_brightness_clamps_level() {
        let mut control = MonitorControl::new(two_monitors(), NeutralContrastSettings::new()).unwrap();
        control.set_brightness(1.5).unwrap();
        assert_eq!(control.brightness(), 1.0);
        assert!(control.monitor_list().iter().all(|m| {
            let range = m.brightness.unwrap();
            range.current == range.max
        }));
    }

    #[test]
    fn test_set_contrast_clamps_to_native_max() {
        let mut settings = NeutralContrastSettings::new();
        settings.insert("A", 50);
        let mut control = MonitorControl::new(two_monitors(), settings).unwrap();

        for level in [0.0, 0.5, 1.0, 1.5, 2.0] {
            control.set_contrast(level).unwrap();
            for monitor in control.monitor_list() {
                let range = monitor.contrast.unwrap();
                let expected = ((level * f64::from(range.neutral)).round() as u32).min(range.max);
                assert_eq!(range.current, expected);
                assert!(range.current <= range.max);
            }
        }
        let list = control.monitor_list();
        assert_eq!(list[0].contrast.unwrap().current, 100);
        assert_eq!(list[1].contrast.unwrap().current, 80);
    }

    #[test]
    fn test_repeated_set_is_single_write() {
        let channel = two_monitors();
        let mut control = MonitorControl::new(channel.clone(), NeutralContrastSettings::new()).unwrap();

        control.set_brightness(0.6).unwrap();
        let after_first = channel.write_count();
        assert_eq!(after_first, 2);

        control.set_brightness(0.6).unwrap();
        assert_eq!(channel.write_count(), after_first);
    }

    #[test]
    fn test_unchanged_target_is_not_written() {
        let channel = two_monitors();
        let mut control = MonitorControl::new(channel.clone(), NeutralContrastSettings::new()).unwrap();

        // A is already at 30 of 100, B goes from 7 to 15
        control.set_brightness(0.3).unwrap();
        let writes = channel.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].value, 15);
        assert_eq!(writes[0].feature, VcpFeature::Brightness);
    }

    #[test]
    fn test_write_failure_does_not_block_others() {
        let channel = MockChannel::new().with_logical(vec![
            MockMonitor::new("stuck").brightness(10, 100).fail_set(),
            MockMonitor::new("fine").brightness(10, 100),
        ]);
        let mut control = MonitorControl::new(channel.clone(), NeutralContrastSettings::new()).unwrap();

        let err = control.set_brightness(0.9).unwrap_err();
        match err {
            ControllerError::WriteFailed(failures) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].monitor, "stuck");
                assert_eq!(failures[0].feature, VcpFeature::Brightness);
            }
            other => panic!("unexpected error: {other}"),
        }

        let list = control.monitor_list();
        assert_eq!(list[0].brightness.unwrap().current, 10);
        assert_eq!(list[1].brightness.unwrap().current, 90);
        assert_eq!(control.brightness(), 0.9);
    }

    #[test]
    fn test_max_contrast() {
        let mut settings = NeutralContrastSettings::new();
        settings.insert("A", 50);
        let control = MonitorControl::new(two_monitors(), settings).unwrap();
        assert_eq!(control.max_contrast(), 2.0);
    }

    #[test]
    fn test_max_contrast_is_capped() {
        let channel = MockChannel::new().with_logical(vec![MockMonitor::new("A").contrast(10, 100)]);
        let mut settings = NeutralContrastSettings::new();
        settings.insert("A", 20);
        let control = MonitorControl::new(channel, settings).unwrap();
        assert_eq!(control.max_contrast(), MAX_CONTRAST_RATIO);
    }

    #[test]
    fn test_max_contrast_without_contrast_monitors() {
        let channel = MockChannel::new().with_logical(vec![MockMonitor::new("A").brightness(1, 10)]);
        let control = MonitorControl::new(channel, NeutralContrastSettings::new()).unwrap();
        assert_eq!(control.max_contrast(), 1.0);
    }

    #[test]
    fn test_update_settings_matches_fresh_probe() {
        let mut old = NeutralContrastSettings::new();
        old.insert("A", 90);
        let mut new = NeutralContrastSettings::new();
        new.insert("A", 40);
        new.insert("B", 60);

        let mut updated = MonitorControl::new(two_monitors(), old).unwrap();
        updated.set_contrast(1.3).unwrap();
        updated.update_settings(new.clone()).unwrap();

        let mut fresh = MonitorControl::new(two_monitors(), new).unwrap();
        fresh.set_contrast(1.3).unwrap();

        assert_eq!(updated.contrast(), 1.3);
        assert_eq!(updated.monitor_list(), fresh.monitor_list());
        assert_eq!(updated.monitor_list()[0].contrast.unwrap().neutral, 40);
        assert_eq!(updated.monitor_list()[1].contrast.unwrap().neutral, 60);
    }

    #[test]
    fn test_update_settings_falls_back_to_max() {
        let mut old = NeutralContrastSettings::new();
        old.insert("A", 50);
        let mut control = MonitorControl::new(two_monitors(), old).unwrap();

        control.update_settings(NeutralContrastSettings::new()).unwrap();
        assert_eq!(control.monitor_list()[0].contrast.unwrap().neutral, 100);
        assert!(control.settings().is_empty());
    }

    #[test]
    fn test_calibrate_captures_current_contrast() {
        let channel = two_monitors();
        let mut control = MonitorControl::new(channel.clone(), NeutralContrastSettings::new()).unwrap();
        let handles = channel.handles();
        channel.adjust(handles[0], VcpFeature::Contrast, 65);
        let writes_before = channel.write_count();

        control.calibrate_neutral_contrast().unwrap();

        let settings = control.settings();
        assert_eq!(settings.get("A"), Some(65));
        assert_eq!(settings.get("B"), Some(80));
        assert_eq!(control.contrast(), 1.0);
        assert_eq!(control.monitor_list()[0].contrast.unwrap().neutral, 65);
        assert_eq!(control.monitor_list()[0].contrast.unwrap().current, 65);
        assert_eq!(channel.write_count(), writes_before);
    }

    #[test]
    fn test_calibrate_skips_unreadable_monitor() {
        let channel = MockChannel::new().with_logical(vec![
            MockMonitor::new("A").brightness(30, 100).contrast(50, 100),
            MockMonitor::new("B").brightness(7, 50),
            MockMonitor::new("C").contrast(40, 80),
        ]);
        let mut old = NeutralContrastSettings::new();
        old.insert("C", 70);
        old.insert("unplugged", 20);
        let mut control = MonitorControl::new(channel.clone(), old).unwrap();
        let handles = channel.handles();
        channel.adjust(handles[0], VcpFeature::Contrast, 65);
        channel.fail_reads(handles[1]);
        channel.fail_reads(handles[2]);

        match control.calibrate_neutral_contrast().unwrap_err() {
            ControllerError::ReadFailed(failures) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].monitor, "C");
                assert_eq!(failures[0].feature, VcpFeature::Contrast);
            }
            other => panic!("unexpected error: {other}"),
        }

        let settings = control.settings();
        assert_eq!(settings.get("A"), Some(65));
        assert_eq!(settings.get("B"), None);
        assert_eq!(settings.get("C"), Some(70));
        assert_eq!(settings.get("unplugged"), Some(20));
        let list = control.monitor_list();
        assert_eq!(list[0].contrast.unwrap().neutral, 65);
        assert_eq!(list[2].contrast.unwrap().neutral, 70);
        assert_eq!(control.contrast(), 1.0);
    }

    #[test]
    fn test_calibrate_zero_contrast_writes_nothing() {
        let channel = MockChannel::new().with_logical(vec![MockMonitor::new("A").contrast(40, 100)]);
        let mut settings = NeutralContrastSettings::new();
        settings.insert("A", 80);
        let mut control = MonitorControl::new(channel.clone(), settings).unwrap();
        let handle = channel.handles()[0];
        channel.adjust(handle, VcpFeature::Contrast, 0);

        control.calibrate_neutral_contrast().unwrap();

        assert_eq!(control.settings().get("A"), Some(80));
        let range = control.monitor_list()[0].contrast.unwrap();
        assert_eq!(range.neutral, 80);
        assert_eq!(range.current, 0);
        assert_eq!(channel.value(handle, VcpFeature::Contrast), Some(0));
        assert_eq!(channel.write_count(), 0);
    }

    #[test]
    fn test_non_finite_level_is_rejected() {
        let channel = two_monitors();
        let mut control = MonitorControl::new(channel.clone(), NeutralContrastSettings::new()).unwrap();

        for level in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                control.set_brightness(level),
                Err(ControllerError::InvalidLevel(_))
            ));
            assert!(matches!(
                control.set_contrast(level),
                Err(ControllerError::InvalidLevel(_))
            ));
        }

        assert_eq!(control.brightness(), 0.3);
        assert_eq!(control.contrast(), 0.5);
        assert_eq!(channel.write_count(), 0);
    }

    #[test]
    fn test_contrast_write_failure_keeps_cached_value() {
        let channel = MockChannel::new().with_logical(vec![
            MockMonitor::new("stuck").contrast(40, 100).fail_set(),
            MockMonitor::new("fine").contrast(40, 100),
        ]);
        let mut control = MonitorControl::new(channel.clone(), NeutralContrastSettings::new()).unwrap();

        match control.set_contrast(0.8).unwrap_err() {
            ControllerError::WriteFailed(failures) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].monitor, "stuck");
                assert_eq!(failures[0].feature, VcpFeature::Contrast);
            }
            other => panic!("unexpected error: {other}"),
        }

        let list = control.monitor_list();
        assert_eq!(list[0].contrast.unwrap().current, 40);
        assert_eq!(list[1].contrast.unwrap().current, 80);
        assert_eq!(channel.value(channel.handles()[0], VcpFeature::Contrast), Some(40));
        assert_eq!(control.contrast(), 0.8);
    }

    #[test]
    fn test_sync_from_hardware() {
        let channel = two_monitors();
        let mut control = MonitorControl::new(channel.clone(), NeutralContrastSettings::new()).unwrap();
        let handles = channel.handles();
        channel.adjust(handles[1], VcpFeature::Brightness, 42);

        control.sync_from_hardware().unwrap();
        assert_eq!(control.monitor_list()[1].brightness.unwrap().current, 42);
        // logical level untouched
        assert_eq!(control.brightness(), 0.3);
    }

    #[test]
    fn test_handles_released_once_on_drop() {
        let channel = two_monitors();
        let mut control = MonitorControl::new(channel.clone(), NeutralContrastSettings::new()).unwrap();
        control.probe().unwrap();
        drop(control);

        assert_eq!(channel.release_calls(), 1);
        let mut released = channel.released();
        released.sort();
        assert_eq!(released, channel.handles());
    }

    #[test]
    fn test_state_snapshot() {
        let control = MonitorControl::new(two_monitors(), NeutralContrastSettings::new()).unwrap();
        let state = control.get_state();
        assert_eq!(state.brightness, 0.3);
        assert_eq!(state.contrast, 0.5);
        assert_eq!(state.max_contrast, 1.0);
        assert_eq!(state.monitors.len(), 2);
        assert!(control.monitor(MonitorId(1)).is_some());
    }
}
