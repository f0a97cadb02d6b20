#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` hazard-zone controller for a proximity-warning panel."]
#![doc = ""]
#![doc = "This crate classifies distance readings into RED/ORANGE/GREEN zones with"]
#![doc = "hysteresis, and reconfigures a set of LED and buzzer indicators whenever the zone changes."]

pub mod controller;
pub mod diagnostics;
pub mod profile;
pub mod settings;
pub mod zone;

pub use controller::{Panel, WarningSystem, MIN_POLL_PERIOD_MS, ZONE_BLINK_HZ};
pub use diagnostics::{DiagnosticSink, NoopSink, ZoneChange};
pub use profile::{BuzzerProfile, ZoneProfiles};
pub use settings::WarningSettings;
pub use zone::{HazardThresholds, Zone};
