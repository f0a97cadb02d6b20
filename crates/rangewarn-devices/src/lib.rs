#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` driver set for a proximity-warning panel."]
#![doc = ""]
#![doc = "This crate provides an ultrasonic distance sensor driver, a blinking LED"]
#![doc = "and a pattern buzzer. Indicators are ticked with the current time and never block;"]
#![doc = "the sensor blocks only for the echo wait, which is bounded by its configured range."]

pub mod devices;
pub mod error;
pub mod traits;

pub use devices::buzzer::{Buzzer, BuzzerState};
pub use devices::led::{Led, LedState};
pub use devices::ultrasonic::UltrasonicSensor;
pub use error::DeviceError;
pub use traits::clock::{MicrosClock, MillisClock};
pub use traits::pulse::{BusyWaitPulseIn, PulseIn};
pub use traits::source::DistanceSource;

/// Lowest frequency accepted by the blinking and pattern indicators (Hz).
pub const MIN_INDICATOR_HZ: f32 = 0.5;

/// Highest frequency accepted by the blinking and pattern indicators (Hz).
pub const MAX_INDICATOR_HZ: f32 = 50.0;

/// Clamp an indicator frequency to `[MIN_INDICATOR_HZ, MAX_INDICATOR_HZ]`.
///
/// NaN is treated as the lowest frequency so a bad input can never produce a
/// zero-length interval.
pub fn clamp_indicator_hz(hz: f32) -> f32 {
    if hz.is_nan() {
        return MIN_INDICATOR_HZ;
    }
    hz.clamp(MIN_INDICATOR_HZ, MAX_INDICATOR_HZ)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_indicator_hz() {
        assert_eq!(clamp_indicator_hz(0.1), 0.5);
        assert_eq!(clamp_indicator_hz(5.0), 5.0);
        assert_eq!(clamp_indicator_hz(120.0), 50.0);
        assert_eq!(clamp_indicator_hz(f32::NAN), 0.5);
    }
}
