//! Per-zone buzzer beep profiles.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::zone::Zone;

/// A beep pattern: beeps per second and the fraction of each beep spent on.
///
/// Values are stored as given and clamped by the buzzer when applied
/// (0.5–50 Hz, 0.05–0.95 duty).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuzzerProfile {
    /// Beeps per second.
    pub freq_hz: f32,
    /// Fraction of each period the buzzer is on.
    pub duty: f32,
}

impl BuzzerProfile {
    /// Construct a profile.
    pub const fn new(freq_hz: f32, duty: f32) -> Self {
        Self { freq_hz, duty }
    }
}

/// Beep profiles for the three alarmed zones.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneProfiles {
    /// Profile while RED: rapid.
    pub red: BuzzerProfile,
    /// Profile while ORANGE.
    pub orange: BuzzerProfile,
    /// Profile while GREEN: sparse.
    pub green: BuzzerProfile,
}

impl Default for ZoneProfiles {
    fn default() -> Self {
        Self {
            red: BuzzerProfile::new(10.0, 0.50),
            orange: BuzzerProfile::new(4.0, 0.30),
            green: BuzzerProfile::new(1.0, 0.10),
        }
    }
}

impl ZoneProfiles {
    /// Profile for `zone`, or `None` for [`Zone::None`], which is silent.
    pub fn for_zone(&self, zone: Zone) -> Option<BuzzerProfile> {
        match zone {
            Zone::Red => Some(self.red),
            Zone::Orange => Some(self.orange),
            Zone::Green => Some(self.green),
            Zone::None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profiles_get_sparser_with_distance() {
        let p = ZoneProfiles::default();
        assert!(p.red.freq_hz > p.orange.freq_hz);
        assert!(p.orange.freq_hz > p.green.freq_hz);
        assert_eq!(p.for_zone(Zone::Green), Some(BuzzerProfile::new(1.0, 0.10)));
        assert_eq!(p.for_zone(Zone::None), None);
    }
}
