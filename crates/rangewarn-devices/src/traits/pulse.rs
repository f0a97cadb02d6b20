//! Echo pulse timing.

use embedded_hal::digital::InputPin;

use super::clock::MicrosClock;

/// Pulse-width measurement on an echo line.
pub trait PulseIn {
    /// Wait for the line to go high, then measure how long it stays high.
    ///
    /// `timeout_us` bounds the whole call, counted from entry: the wait for
    /// the rising edge and the pulse itself both spend from the same budget.
    ///
    /// # Returns
    /// * `Some(width_us)` once a complete high pulse has been seen
    /// * `None` if the budget ran out first
    fn pulse_high_us(&mut self, timeout_us: u32) -> Option<u32>;
}

/// [`PulseIn`] over any `embedded-hal` input by polling the pin against a
/// microsecond clock.
///
/// A pulse already in progress on entry is skipped so the measured width is
/// always a full pulse. A pin read error is reported as no pulse.
pub struct BusyWaitPulseIn<P, C> {
    pin: P,
    clock: C,
}

impl<P, C> BusyWaitPulseIn<P, C>
where
    P: InputPin,
    C: MicrosClock,
{
    /// Wrap an echo input and the clock used to time it.
    pub fn new(pin: P, clock: C) -> Self {
        Self { pin, clock }
    }

    /// Give back the pin and clock.
    pub fn release(self) -> (P, C) {
        (self.pin, self.clock)
    }

    fn expired(&self, start_us: u32, timeout_us: u32) -> bool {
        self.clock.now_us().wrapping_sub(start_us) >= timeout_us
    }
}

impl<P, C> PulseIn for BusyWaitPulseIn<P, C>
where
    P: InputPin,
    C: MicrosClock,
{
    fn pulse_high_us(&mut self, timeout_us: u32) -> Option<u32> {
        let start_us = self.clock.now_us();

        // Skip the tail of a pulse that started before we were called.
        while self.pin.is_high().ok()? {
            if self.expired(start_us, timeout_us) {
                return None;
            }
        }

        while self.pin.is_low().ok()? {
            if self.expired(start_us, timeout_us) {
                return None;
            }
        }
        let rise_us = self.clock.now_us();

        while self.pin.is_high().ok()? {
            if self.expired(start_us, timeout_us) {
                return None;
            }
        }

        Some(self.clock.now_us().wrapping_sub(rise_us))
    }
}
