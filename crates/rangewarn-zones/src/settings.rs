//! Bundled controller configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::profile::ZoneProfiles;
use crate::zone::HazardThresholds;

/// Everything tunable on a [`WarningSystem`](crate::WarningSystem), in one
/// value that a host can load from a config file.
///
/// Missing fields fall back to the defaults when deserialized.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarningSettings {
    /// Zone bands and hysteresis.
    pub thresholds: HazardThresholds,
    /// Minimum time between sensor polls (ms). Floored at 10 when applied.
    pub poll_period_ms: u16,
    /// Beep profile per zone.
    pub profiles: ZoneProfiles,
    /// Report zone changes to the diagnostics sink.
    pub log_reactions: bool,
}

impl Default for WarningSettings {
    fn default() -> Self {
        Self {
            thresholds: HazardThresholds::default(),
            poll_period_ms: 50,
            profiles: ZoneProfiles::default(),
            log_reactions: true,
        }
    }
}
