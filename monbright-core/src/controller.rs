//! Brightness and contrast controller.

use std::collections::HashMap;

use log::{debug, info, warn};

use crate::channel::{MonitorChannel, PhysicalHandle};
use crate::error::{ControllerError, FeatureFailure};
use crate::monitor::{MonitorId, MonitorRecord};
use crate::settings::NeutralContrastSettings;
use crate::state::ControllerState;
use crate::vcp::VcpFeature;

// =============================================================================
// Configuration
// =============================================================================

/// Default cap on physical monitors acquired per logical monitor.
pub const MAX_PHYSICAL_MONITORS: usize = 32;

/// Upper bound of [`MonitorControl::max_contrast`], i.e. 200% of neutral.
pub const MAX_CONTRAST_RATIO: f64 = 2.0;

/// Tunables for [`MonitorControl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlConfig {
    /// How many physical monitors to acquire per logical monitor.
    pub max_physical_per_logical: usize,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            max_physical_per_logical: MAX_PHYSICAL_MONITORS,
        }
    }
}

// =============================================================================
// MonitorControl
// =============================================================================

pub(crate) struct MonitorEntry {
    pub(crate) handle: PhysicalHandle,
    pub(crate) record: MonitorRecord,
}

/// Drives brightness and contrast of every attached monitor from one
/// normalized value.
///
/// Logical brightness runs from 0 to 1 and is scaled to each monitor's native
/// range. Logical contrast is relative to each monitor's neutral contrast, so
/// 1.0 means "neutral" everywhere and values up to [`max_contrast`] push
/// monitors past it.
///
/// Hardware is only written when a monitor's target value actually changes.
/// All physical monitor handles are released when the controller is dropped.
///
/// # Example
///
/// ```
/// use monbright_core::{MockChannel, MockMonitor, MonitorControl, NeutralContrastSettings};
///
/// let channel = MockChannel::new()
///     .with_logical(vec![MockMonitor::new("DELL U2415").brightness(20, 100).contrast(75, 100)]);
/// let mut control = MonitorControl::new(channel.clone(), NeutralContrastSettings::new())?;
///
/// control.set_brightness(0.5)?;
/// assert_eq!(control.monitor_list()[0].brightness.unwrap().current, 50);
/// assert_eq!(channel.write_count(), 1);
/// # Ok::<(), monbright_core::ControllerError>(())
/// ```
///
/// [`max_contrast`]: MonitorControl::max_contrast
pub struct MonitorControl<C: MonitorChannel> {
    pub(crate) channel: C,
    pub(crate) config: ControlConfig,
    pub(crate) settings: NeutralContrastSettings,
    pub(crate) monitors: Vec<MonitorEntry>,
    pub(crate) index: HashMap<PhysicalHandle, MonitorId>,
    pub(crate) acquired: Vec<PhysicalHandle>,
    pub(crate) brightness: Option<f64>,
    pub(crate) contrast: Option<f64>,
    pub(crate) truncated: usize,
}

impl<C: MonitorChannel> MonitorControl<C> {
    /// Create a controller and probe all monitors.
    ///
    /// # Errors
    ///
    /// - [`ControllerError::Channel`] if logical monitors cannot be enumerated
    pub fn new(channel: C, settings: NeutralContrastSettings) -> Result<Self, ControllerError> {
        Self::with_config(channel, settings, ControlConfig::default())
    }

    /// Like [`new`](Self::new) with explicit configuration.
    pub fn with_config(
        channel: C,
        settings: NeutralContrastSettings,
        config: ControlConfig,
    ) -> Result<Self, ControllerError> {
        let mut control = Self {
            channel,
            config,
            settings,
            monitors: Vec::new(),
            index: HashMap::new(),
            acquired: Vec::new(),
            brightness: None,
            contrast: None,
            truncated: 0,
        };
        control.probe()?;
        Ok(control)
    }

    /// Logical brightness in `[0, 1]`.
    pub fn brightness(&self) -> f64 {
        self.brightness.unwrap_or(0.0)
    }

    /// Set the logical brightness of all monitors.
    ///
    /// `level` is clamped into `[0, 1]`. Every monitor gets
    /// `round(level * max)`; monitors already at that value are not written.
    ///
    /// # Errors
    ///
    /// - [`ControllerError::InvalidLevel`] if `level` is NaN or infinite
    /// - [`ControllerError::WriteFailed`] listing the monitors that rejected
    ///   the write. Their cached value is left unchanged, all other monitors
    ///   are still updated.
    pub fn set_brightness(&mut self, level: f64) -> Result<(), ControllerError> {
        if !level.is_finite() {
            return Err(ControllerError::InvalidLevel(level));
        }
        let level = level.clamp(0.0, 1.0);
        self.brightness = Some(level);

        let mut failures = Vec::new();
        for entry in &mut self.monitors {
            let Some(range) = entry.record.brightness.as_mut() else {
                continue;
            };
            let target = scale(level, range.max).min(range.max);
            write_feature(
                &self.channel,
                entry.handle,
                &entry.record.name,
                VcpFeature::Brightness,
                target,
                &mut range.current,
                &mut failures,
            );
        }
        collect_failures(failures, ControllerError::WriteFailed)
    }

    /// Logical contrast, 1.0 being neutral.
    pub fn contrast(&self) -> f64 {
        self.contrast.unwrap_or(0.0)
    }

    /// Set the logical contrast of all monitors.
    ///
    /// Every monitor gets `min(round(level * neutral), max)`. Negative levels
    /// are treated as zero.
    ///
    /// # Errors
    ///
    /// Same as [`set_brightness`](Self::set_brightness).
    pub fn set_contrast(&mut self, level: f64) -> Result<(), ControllerError> {
        if !level.is_finite() {
            return Err(ControllerError::InvalidLevel(level));
        }
        let level = level.max(0.0);
        self.contrast = Some(level);

        let mut failures = Vec::new();
        for entry in &mut self.monitors {
            let Some(range) = entry.record.contrast.as_mut() else {
                continue;
            };
            let target = scale(level, range.neutral).min(range.max);
            write_feature(
                &self.channel,
                entry.handle,
                &entry.record.name,
                VcpFeature::Contrast,
                target,
                &mut range.current,
                &mut failures,
            );
        }
        collect_failures(failures, ControllerError::WriteFailed)
    }

    /// Largest useful logical contrast.
    ///
    /// This is the highest `max / neutral` ratio among contrast-capable
    /// monitors, capped at [`MAX_CONTRAST_RATIO`]. Without any such monitor
    /// it is 1.0.
    pub fn max_contrast(&self) -> f64 {
        self.monitors
            .iter()
            .filter_map(|entry| entry.record.contrast)
            .map(|range| f64::from(range.max) / f64::from(range.neutral))
            .reduce(f64::max)
            .map_or(1.0, |ratio| ratio.min(MAX_CONTRAST_RATIO))
    }

    /// Whether at least one monitor supports brightness control.
    pub fn has_any_supported_monitors(&self) -> bool {
        self.monitors
            .iter()
            .any(|entry| entry.record.supports_brightness())
    }

    /// Copies of all monitor records in probe order.
    pub fn monitor_list(&self) -> Vec<MonitorRecord> {
        self.monitors
            .iter()
            .map(|entry| entry.record.clone())
            .collect()
    }

    /// Look up a single monitor.
    pub fn monitor(&self, id: MonitorId) -> Option<&MonitorRecord> {
        self.monitors.get(id.0).map(|entry| &entry.record)
    }

    /// The neutral contrast settings currently in effect.
    pub fn settings(&self) -> &NeutralContrastSettings {
        &self.settings
    }

    /// Physical monitors left out by the per-logical-monitor cap in the most
    /// recent probe.
    pub fn truncated_handles(&self) -> usize {
        self.truncated
    }

    /// Get a snapshot of the current controller state.
    pub fn get_state(&self) -> ControllerState {
        ControllerState {
            brightness: self.brightness(),
            contrast: self.contrast(),
            max_contrast: self.max_contrast(),
            monitors: self.monitor_list(),
        }
    }

    /// Replace the neutral contrast settings and re-apply the current
    /// logical contrast against the new neutral points.
    ///
    /// Monitors without a saved entry fall back to their native maximum.
    ///
    /// # Errors
    ///
    /// Same as [`set_contrast`](Self::set_contrast).
    pub fn update_settings(
        &mut self,
        settings: NeutralContrastSettings,
    ) -> Result<(), ControllerError> {
        self.settings = settings;
        for entry in &mut self.monitors {
            if let Some(range) = entry.record.contrast.as_mut() {
                range.neutral = self.settings.resolve(&entry.record.name, range.max);
            }
        }
        info!("neutral contrast settings updated ({} saved)", self.settings.len());
        self.set_contrast(self.contrast())
    }

    /// Re-read current brightness and contrast from every monitor.
    ///
    /// Picks up changes made through the monitor's own menu. Logical levels
    /// are not touched.
    ///
    /// # Errors
    ///
    /// - [`ControllerError::ReadFailed`] listing monitors that could not be
    ///   read. Their cached values are kept.
    pub fn sync_from_hardware(&mut self) -> Result<(), ControllerError> {
        let mut failures = Vec::new();
        for entry in &mut self.monitors {
            let brightness = entry
                .record
                .brightness
                .as_mut()
                .map(|range| (&mut range.current, range.max));
            let contrast = entry
                .record
                .contrast
                .as_mut()
                .map(|range| (&mut range.current, range.max));

            for (feature, range) in [
                (VcpFeature::Brightness, brightness),
                (VcpFeature::Contrast, contrast),
            ] {
                let Some((current, max)) = range else {
                    continue;
                };
                match self.channel.get_feature(entry.handle, feature) {
                    Ok(value) => *current = value.current.min(max),
                    Err(source) => {
                        warn!("failed to read {} of '{}': {}", feature, entry.record.name, source);
                        failures.push(FeatureFailure {
                            monitor: entry.record.name.clone(),
                            feature,
                            source,
                        });
                    }
                }
            }
        }
        collect_failures(failures, ControllerError::ReadFailed)
    }

    /// Make every monitor's current contrast its new neutral contrast.
    ///
    /// Reads contrast back from the hardware first, so the user can dial in
    /// the desired look on each monitor and then capture it. The logical
    /// contrast becomes 1.0 and nothing is written, so every monitor stays
    /// where it is. The new settings are available from
    /// [`settings`](Self::settings) and keep entries of monitors that are not
    /// connected. Persisting them is up to the caller.
    ///
    /// Monitors that cannot be read, or that report a contrast of 0, keep
    /// their previous neutral contrast.
    ///
    /// # Errors
    ///
    /// - [`ControllerError::ReadFailed`] listing the monitors that could not
    ///   be read. All other monitors are calibrated regardless.
    pub fn calibrate_neutral_contrast(&mut self) -> Result<(), ControllerError> {
        let mut settings = self.settings.clone();
        let mut failures = Vec::new();

        for entry in &mut self.monitors {
            let Some(range) = entry.record.contrast.as_mut() else {
                continue;
            };
            match self.channel.get_feature(entry.handle, VcpFeature::Contrast) {
                Ok(value) => range.current = value.current.min(range.max),
                Err(source) => {
                    warn!("not calibrating '{}': {}", entry.record.name, source);
                    failures.push(FeatureFailure {
                        monitor: entry.record.name.clone(),
                        feature: VcpFeature::Contrast,
                        source,
                    });
                    continue;
                }
            }
            if range.current == 0 {
                warn!("'{}' reports contrast 0, keeping neutral {}", entry.record.name, range.neutral);
                continue;
            }
            settings.insert(entry.record.name.clone(), range.current);
        }

        self.settings = settings;
        for entry in &mut self.monitors {
            if let Some(range) = entry.record.contrast.as_mut() {
                range.neutral = self.settings.resolve(&entry.record.name, range.max);
            }
        }
        self.contrast = Some(1.0);
        info!("calibrated neutral contrast ({} saved)", self.settings.len());

        collect_failures(failures, ControllerError::ReadFailed)
    }
}

impl<C: MonitorChannel> Drop for MonitorControl<C> {
    fn drop(&mut self) {
        let mut handles = std::mem::take(&mut self.acquired);
        handles.sort_unstable();
        handles.dedup();
        if !handles.is_empty() {
            debug!("releasing {} physical monitor handle(s)", handles.len());
            self.channel.release(&handles);
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// `round(level * max)` in hardware units.
fn scale(level: f64, max: u32) -> u32 {
    // `as` saturates, so out of range products end up at 0 or u32::MAX.
    (level * f64::from(max)).round() as u32
}

fn write_feature<C: MonitorChannel>(
    channel: &C,
    handle: PhysicalHandle,
    name: &str,
    feature: VcpFeature,
    target: u32,
    current: &mut u32,
    failures: &mut Vec<FeatureFailure>,
) {
    if target == *current {
        return;
    }
    match channel.set_feature(handle, feature, target) {
        Ok(()) => {
            debug!("set {} of '{}': {} -> {}", feature, name, current, target);
            *current = target;
        }
        Err(source) => {
            warn!("failed to set {} of '{}' to {}: {}", feature, name, target, source);
            failures.push(FeatureFailure {
                monitor: name.to_string(),
                feature,
                source,
            });
        }
    }
}

fn collect_failures(
    failures: Vec<FeatureFailure>,
    wrap: fn(Vec<FeatureFailure>) -> ControllerError,
) -> Result<(), ControllerError> {
    if failures.is_empty() {
        Ok(())
    } else {
        Err(wrap(failures))
    }
}
