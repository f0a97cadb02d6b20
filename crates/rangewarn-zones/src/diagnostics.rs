//! Diagnostic output for zone transitions.

use crate::zone::Zone;

/// A zone transition as reported to a [`DiagnosticSink`].
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneChange {
    /// The zone just entered.
    pub zone: Zone,
    /// Poll time (ms) at which the change was detected.
    pub at_ms: u32,
    /// Time since the previous poll (ms), an upper bound on detection delay.
    pub reaction_ms: u32,
    /// The reading that caused the change, `None` if invalid.
    pub distance_cm: Option<f32>,
}

/// Receiver of zone-change events, e.g. a serial console or a log.
pub trait DiagnosticSink {
    /// Called once per zone transition while reaction logging is enabled.
    fn zone_changed(&mut self, change: &ZoneChange);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn zone_changed(&mut self, _change: &ZoneChange) {}
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &mut T {
    fn zone_changed(&mut self, change: &ZoneChange) {
        (**self).zone_changed(change);
    }
}
