//! The distance-reading seam used by the zone controller.

/// Anything that can produce a filtered distance reading.
///
/// The zone controller only needs this one operation from its sensor, which
/// keeps it testable with a scripted source in place of real hardware.
pub trait DistanceSource {
    /// Take `samples` readings (clamped to `1..=10`), waiting
    /// `inter_sample_delay_ms` between them, and return the mean of the valid
    /// ones in centimetres.
    ///
    /// # Returns
    /// * `Some(cm)` if at least one sample was valid
    /// * `None` if every sample timed out or fell outside the valid range
    fn sample_averaged(&mut self, samples: u8, inter_sample_delay_ms: u16) -> Option<f32>;
}
