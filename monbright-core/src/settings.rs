//! Saved neutral contrast references.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Neutral contrast reference per monitor name.
///
/// Storage is up to the caller. This type serialises as a plain
/// `name = value` map.
///
/// ```
/// use monbright_core::NeutralContrastSettings;
///
/// let mut settings = NeutralContrastSettings::new();
/// settings.insert("DELL U2415", 50);
/// assert_eq!(settings.resolve("DELL U2415", 100), 50);
/// assert_eq!(settings.resolve("Generic PnP Monitor", 80), 80);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeutralContrastSettings {
    saved: BTreeMap<String, u32>,
}

impl NeutralContrastSettings {
    /// Create empty settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Saved reference for a monitor, if any.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.saved.get(name).copied()
    }

    /// Save a reference, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, neutral: u32) -> Option<u32> {
        self.saved.insert(name.into(), neutral)
    }

    /// Forget the reference of a monitor.
    pub fn remove(&mut self, name: &str) -> Option<u32> {
        self.saved.remove(name)
    }

    /// Number of saved references.
    pub fn len(&self) -> usize {
        self.saved.len()
    }

    /// Whether nothing is saved.
    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }

    /// Neutral contrast for a monitor with the given native maximum.
    ///
    /// Falls back to `max_contrast` when nothing is saved. Saved values are
    /// clamped into `[1, max_contrast]` since the result is used as a divisor.
    pub fn resolve(&self, name: &str, max_contrast: u32) -> u32 {
        let ceiling = max_contrast.max(1);
        match self.get(name) {
            Some(saved) => {
                let neutral = saved.clamp(1, ceiling);
                if neutral != saved {
                    warn!(
                        "saved neutral contrast {} for '{}' is outside 1-{}, using {}",
                        saved, name, ceiling, neutral
                    );
                }
                neutral
            }
            None => {
                debug!("no neutral contrast saved for '{}', using {}", name, ceiling);
                ceiling
            }
        }
    }
}

impl FromIterator<(String, u32)> for NeutralContrastSettings {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        Self {
            saved: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults_to_max() {
        let settings = NeutralContrastSettings::new();
        assert_eq!(settings.resolve("A", 100), 100);
    }

    #[test]
    fn test_resolve_uses_saved() {
        let settings: NeutralContrastSettings = [("A".to_string(), 60)].into_iter().collect();
        assert_eq!(settings.resolve("A", 100), 60);
        assert_eq!(settings.resolve("B", 75), 75);
    }

    #[test]
    fn test_resolve_clamps_out_of_range() {
        let mut settings = NeutralContrastSettings::new();
        settings.insert("big", 150);
        settings.insert("zero", 0);
        assert_eq!(settings.resolve("big", 100), 100);
        assert_eq!(settings.resolve("zero", 100), 1);
    }

    #[test]
    fn test_resolve_zero_max_never_yields_zero() {
        let settings = NeutralContrastSettings::new();
        assert_eq!(settings.resolve("A", 0), 1);
    }
}
