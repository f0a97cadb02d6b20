//! Hazard zones and the hysteresis transition table.
//!
//! The next zone depends on the current one: each zone has its own decision
//! function with the band edges pushed outward by the hysteresis margin, so a
//! reading hovering at a threshold cannot make the panel chatter.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Discrete hazard classification of a distance reading.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Zone {
    /// No valid reading: nothing in range or no echo.
    #[default]
    None = 0,
    /// Closer than the near threshold.
    Red = 1,
    /// Between the near and mid thresholds.
    Orange = 2,
    /// Beyond the mid threshold.
    Green = 3,
}

impl Zone {
    /// Stable numeric id used in diagnostics (0 = none, 1 = red, 2 = orange, 3 = green).
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Lowercase name of the zone.
    pub const fn as_str(self) -> &'static str {
        match self {
            Zone::None => "none",
            Zone::Red => "red",
            Zone::Orange => "orange",
            Zone::Green => "green",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distance bands and the hysteresis margin applied around their edges.
///
/// Expected `near_cm < mid_cm` and `hysteresis_cm < mid_cm - near_cm`; neither is
/// enforced. Edges are computed in `f32`, so a margin larger than a threshold
/// simply yields a negative edge.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HazardThresholds {
    /// Below this distance (cm) is RED.
    pub near_cm: u16,
    /// Below this distance (cm) is ORANGE, at or above it GREEN.
    pub mid_cm: u16,
    /// Margin (cm) a reading must clear before leaving the current zone.
    pub hysteresis_cm: u8,
}

impl Default for HazardThresholds {
    fn default() -> Self {
        Self {
            near_cm: 50,
            mid_cm: 100,
            hysteresis_cm: 5,
        }
    }
}

impl HazardThresholds {
    /// Construct thresholds.
    pub const fn new(near_cm: u16, mid_cm: u16, hysteresis_cm: u8) -> Self {
        Self {
            near_cm,
            mid_cm,
            hysteresis_cm,
        }
    }

    /// Decide the zone for `reading` given the zone the system is in now.
    ///
    /// An invalid reading always yields [`Zone::None`].
    pub fn next_zone(&self, current: Zone, reading: Option<f32>) -> Zone {
        let Some(d) = reading else {
            return Zone::None;
        };

        match current {
            Zone::Red => self.from_red(d),
            Zone::Orange => self.from_orange(d),
            Zone::Green => self.from_green(d),
            Zone::None => self.classify(d),
        }
    }

    /// Plain classification without hysteresis.
    pub fn classify(&self, d: f32) -> Zone {
        if d < self.near() {
            Zone::Red
        } else if d < self.mid() {
            Zone::Orange
        } else {
            Zone::Green
        }
    }

    fn from_red(&self, d: f32) -> Zone {
        if d < self.near() + self.hys() {
            return Zone::Red;
        }
        // Far enough out to skip ORANGE entirely.
        if d < self.mid() - self.hys() {
            Zone::Orange
        } else {
            Zone::Green
        }
    }

    fn from_orange(&self, d: f32) -> Zone {
        if d < self.near() - self.hys() {
            Zone::Red
        } else if d >= self.mid() + self.hys() {
            Zone::Green
        } else {
            Zone::Orange
        }
    }

    fn from_green(&self, d: f32) -> Zone {
        if d >= self.mid() - self.hys() {
            return Zone::Green;
        }
        if d < self.near() + self.hys() {
            Zone::Red
        } else {
            Zone::Orange
        }
    }

    fn near(&self) -> f32 {
        f32::from(self.near_cm)
    }

    fn mid(&self) -> f32 {
        f32::from(self.mid_cm)
    }

    fn hys(&self) -> f32 {
        f32::from(self.hysteresis_cm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Zone; 4] = [Zone::None, Zone::Red, Zone::Orange, Zone::Green];

    fn th() -> HazardThresholds {
        HazardThresholds::new(50, 100, 5)
    }

    /// Distances from 0 to 200 cm in quarter-centimetre steps.
    fn sweep() -> impl Iterator<Item = f32> {
        (0..=800).map(|i| i as f32 * 0.25)
    }

    #[test]
    fn test_defaults() {
        assert_eq!(HazardThresholds::default(), th());
        assert_eq!(Zone::default(), Zone::None);
    }

    #[test]
    fn test_zone_ids() {
        assert_eq!(Zone::None.id(), 0);
        assert_eq!(Zone::Red.id(), 1);
        assert_eq!(Zone::Orange.id(), 2);
        assert_eq!(Zone::Green.id(), 3);
        assert_eq!(Zone::Orange.to_string(), "orange");
    }

    #[test]
    fn test_invalid_reading_is_none_from_every_zone() {
        for zone in ALL {
            assert_eq!(th().next_zone(zone, None), Zone::None);
        }
    }

    #[test]
    fn test_from_none_has_no_hysteresis() {
        let t = th();
        assert_eq!(t.next_zone(Zone::None, Some(49.9)), Zone::Red);
        assert_eq!(t.next_zone(Zone::None, Some(50.0)), Zone::Orange);
        assert_eq!(t.next_zone(Zone::None, Some(99.9)), Zone::Orange);
        assert_eq!(t.next_zone(Zone::None, Some(100.0)), Zone::Green);
    }

    #[test]
    fn test_orange_drops_to_red_below_near_minus_hys() {
        let t = th();
        for d in sweep().filter(|d| *d < 45.0) {
            assert_eq!(t.next_zone(Zone::Orange, Some(d)), Zone::Red, "d = {}", d);
        }
        assert_eq!(t.next_zone(Zone::Orange, Some(45.0)), Zone::Orange);
        assert_eq!(t.next_zone(Zone::Orange, Some(104.9)), Zone::Orange);
        assert_eq!(t.next_zone(Zone::Orange, Some(105.0)), Zone::Green);
    }

    #[test]
    fn test_red_leaves_at_near_plus_hys() {
        let t = th();
        for d in sweep().filter(|d| *d >= 55.0) {
            assert_ne!(t.next_zone(Zone::Red, Some(d)), Zone::Red, "d = {}", d);
        }
        assert_eq!(t.next_zone(Zone::Red, Some(54.9)), Zone::Red);
        assert_eq!(t.next_zone(Zone::Red, Some(55.0)), Zone::Orange);
        assert_eq!(t.next_zone(Zone::Red, Some(94.9)), Zone::Orange);
        // Clears mid - hys as well: straight to GREEN.
        assert_eq!(t.next_zone(Zone::Red, Some(95.0)), Zone::Green);
    }

    #[test]
    fn test_green_holds_down_to_mid_minus_hys() {
        let t = th();
        for d in sweep().filter(|d| *d >= 95.0) {
            assert_eq!(t.next_zone(Zone::Green, Some(d)), Zone::Green, "d = {}", d);
        }
        assert_eq!(t.next_zone(Zone::Green, Some(94.9)), Zone::Orange);
        assert_eq!(t.next_zone(Zone::Green, Some(55.0)), Zone::Orange);
        assert_eq!(t.next_zone(Zone::Green, Some(54.9)), Zone::Red);
    }

    #[test]
    fn test_boundary_does_not_chatter() {
        let t = th();
        let mut zone = t.next_zone(Zone::None, Some(101.0));
        assert_eq!(zone, Zone::Green);
        for d in [99.0, 101.0, 96.0, 100.0, 95.5, 99.9] {
            zone = t.next_zone(zone, Some(d));
            assert_eq!(zone, Zone::Green);
        }
    }

    #[test]
    fn test_scripted_walk() {
        let t = th();
        let mut zone = Zone::None;
        let mut seen = Vec::new();
        for d in [120.0, 90.0, 40.0, 130.0] {
            zone = t.next_zone(zone, Some(d));
            seen.push(zone);
        }
        assert_eq!(seen, [Zone::Green, Zone::Orange, Zone::Red, Zone::Green]);
    }

    #[test]
    fn test_margin_wider_than_near_threshold() {
        let t = HazardThresholds::new(3, 100, 5);
        // near - hys is negative: ORANGE can no longer fall to RED.
        assert_eq!(t.next_zone(Zone::Orange, Some(0.0)), Zone::Orange);
        assert_eq!(t.next_zone(Zone::Green, Some(7.9)), Zone::Red);
    }
}
