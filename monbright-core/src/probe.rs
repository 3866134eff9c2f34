//! Monitor discovery.

use log::{debug, info, warn};

use crate::capabilities::Capabilities;
use crate::channel::{MonitorChannel, PhysicalHandle};
use crate::controller::{MonitorControl, MonitorEntry};
use crate::error::ControllerError;
use crate::monitor::{ContrastRange, FeatureRange, MonitorId, MonitorRecord};
use crate::settings::NeutralContrastSettings;
use crate::vcp::VcpFeature;

// =============================================================================
// Probe Report
// =============================================================================

/// Summary of one probe pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeReport {
    /// Logical monitors enumerated.
    pub logical: usize,
    /// Physical monitors added to the registry by this pass.
    pub discovered: usize,
    /// Physical handles skipped because they were already known.
    pub duplicates: usize,
    /// Physical monitors left out because of the per-logical-monitor cap.
    pub truncated: usize,
    /// Logical or physical monitors whose I/O failed part way.
    pub failed: usize,
}

// =============================================================================
// Discovery
// =============================================================================

impl<C: MonitorChannel> MonitorControl<C> {
    /// Discover monitors and add the ones not seen before.
    ///
    /// Already known handles are left untouched, so probing again only picks
    /// up newly connected monitors. A monitor whose I/O fails is still
    /// recorded with whatever could be read before the failure.
    ///
    /// # Errors
    ///
    /// Only a failure to enumerate logical monitors is reported. Per-monitor
    /// failures are logged and counted in [`ProbeReport::failed`].
    pub fn probe(&mut self) -> Result<ProbeReport, ControllerError> {
        let logical = self.channel.logical_monitors()?;
        let mut report = ProbeReport {
            logical: logical.len(),
            ..Default::default()
        };

        for logical_monitor in logical {
            let physical = match self
                .channel
                .physical_monitors(logical_monitor, self.config.max_physical_per_logical)
            {
                Ok(physical) => physical,
                Err(e) => {
                    warn!("skipping logical monitor {:?}: {}", logical_monitor, e);
                    report.failed += 1;
                    continue;
                }
            };

            if physical.truncated() > 0 {
                warn!(
                    "logical monitor {:?} has {} physical monitors, only using {}",
                    logical_monitor,
                    physical.available,
                    physical.monitors.len()
                );
                report.truncated += physical.truncated();
            }

            self.acquired
                .extend(physical.monitors.iter().map(|monitor| monitor.handle));

            for monitor in physical.monitors {
                if self.index.contains_key(&monitor.handle) {
                    debug!("already know {:?}, skipping", monitor.handle);
                    report.duplicates += 1;
                    continue;
                }

                let id = MonitorId(self.monitors.len());
                let mut record = MonitorRecord::new(id, monitor.description);
                if let Err(e) = read_monitor(&self.channel, &self.settings, monitor.handle, &mut record) {
                    warn!("incomplete probe of '{}': {}", record.name, e);
                    report.failed += 1;
                }

                debug!(
                    "found '{}' (mccs {:?}): brightness={:?}, contrast={:?}",
                    record.name, record.protocol_version, record.brightness, record.contrast
                );

                self.seed_levels(&record);
                self.index.insert(monitor.handle, id);
                self.monitors.push(MonitorEntry {
                    handle: monitor.handle,
                    record,
                });
                report.discovered += 1;
            }
        }

        self.truncated = report.truncated;
        info!(
            "probe complete: {} new monitor(s), {} known, {} failed, {} truncated",
            report.discovered, report.duplicates, report.failed, report.truncated
        );
        Ok(report)
    }

    /// The first monitor supporting a feature decides the initial logical level.
    fn seed_levels(&mut self, record: &MonitorRecord) {
        if self.brightness.is_none() {
            if let Some(range) = record.brightness.filter(|range| range.max > 0) {
                self.brightness = Some(f64::from(range.current) / f64::from(range.max));
            }
        }
        if self.contrast.is_none() {
            if let Some(range) = record.contrast {
                self.contrast = Some(f64::from(range.current) / f64::from(range.neutral));
            }
        }
    }
}

// =============================================================================
// Per-Monitor Reads
// =============================================================================

/// Fill in a record from the monitor, stopping at the first failure.
fn read_monitor<C: MonitorChannel>(
    channel: &C,
    settings: &NeutralContrastSettings,
    handle: PhysicalHandle,
    record: &mut MonitorRecord,
) -> Result<(), ControllerError> {
    let text = channel.capabilities(handle)?;
    let capabilities = Capabilities::parse(&text)?;
    record.protocol_version = capabilities.protocol_version.clone();

    if capabilities.supports(VcpFeature::Brightness) {
        let value = channel.get_feature(handle, VcpFeature::Brightness)?;
        record.brightness = Some(FeatureRange {
            current: value.current.min(value.maximum),
            max: value.maximum,
        });
    }

    if capabilities.supports(VcpFeature::Contrast) {
        let value = channel.get_feature(handle, VcpFeature::Contrast)?;
        record.contrast = Some(ContrastRange {
            current: value.current.min(value.maximum),
            max: value.maximum,
            neutral: settings.resolve(&record.name, value.maximum),
        });
    }

    Ok(())
}
