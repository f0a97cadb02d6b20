//! Error types for the device drivers.
//!
//! Sensing problems never show up here: a missing echo or an out-of-range
//! distance is reported as an invalid reading instead. The only failure a
//! driver surfaces is a GPIO write the HAL refused.

use core::fmt;

use embedded_hal::digital::ErrorKind;

/// Errors that can occur while driving an indicator pin.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// The HAL rejected a pin write.
    /// Carries the portable error kind reported by the pin implementation.
    Pin(ErrorKind),
}

impl DeviceError {
    /// Wrap any `embedded-hal` digital error.
    pub fn pin<E: embedded_hal::digital::Error>(err: E) -> Self {
        DeviceError::Pin(err.kind())
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Pin(kind) => write!(f, "Pin write failed: {:?}", kind),
        }
    }
}

impl core::error::Error for DeviceError {}
