//! Blinking LED indicator.

use embedded_hal::digital::OutputPin;

use crate::clamp_indicator_hz;
use crate::error::DeviceError;

/// Operating mode of a [`Led`].
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedState {
    /// Steady off.
    Off,
    /// Steady on.
    On,
    /// Toggling every half period.
    Blink,
}

/// An LED that can be held on, held off, or blinked without blocking.
///
/// Blinking is driven by [`update`](Led::update), which must be called
/// frequently with the current millisecond time.
pub struct Led<P> {
    pin: P,
    state: LedState,
    is_on: bool,
    toggle_interval_ms: u32,
    last_toggle_ms: u32,
}

impl<P: OutputPin> Led<P> {
    /// Take ownership of `pin` and drive it low.
    ///
    /// The blink interval starts at 100 ms (5 Hz).
    pub fn new(pin: P) -> Result<Self, DeviceError> {
        let mut led = Self {
            pin,
            state: LedState::Off,
            is_on: false,
            toggle_interval_ms: 100,
            last_toggle_ms: 0,
        };
        led.write_off()?;
        Ok(led)
    }

    /// Hold the LED on.
    pub fn turn_on(&mut self) -> Result<(), DeviceError> {
        self.state = LedState::On;
        self.write_on()
    }

    /// Hold the LED off.
    pub fn turn_off(&mut self) -> Result<(), DeviceError> {
        self.state = LedState::Off;
        self.write_off()
    }

    /// Start blinking at `hz` (clamped to 0.5–50 Hz).
    ///
    /// The output is forced off and the toggle timer restarts at `now_ms`, so
    /// the first transition is a rising edge one half period later.
    pub fn blink(&mut self, hz: f32, now_ms: u32) -> Result<(), DeviceError> {
        self.set_blink_hz(hz);
        self.state = LedState::Blink;
        self.last_toggle_ms = now_ms;
        self.write_off()
    }

    /// Change the blink frequency without touching the current state.
    pub fn set_blink_hz(&mut self, hz: f32) {
        let hz = clamp_indicator_hz(hz);
        self.toggle_interval_ms = (500.0 / hz) as u32;
    }

    /// Advance the blink timer. A no-op unless blinking.
    pub fn update(&mut self, now_ms: u32) -> Result<(), DeviceError> {
        if self.state != LedState::Blink {
            return Ok(());
        }

        if now_ms.wrapping_sub(self.last_toggle_ms) >= self.toggle_interval_ms {
            self.last_toggle_ms = now_ms;
            if self.is_on {
                self.write_off()?;
            } else {
                self.write_on()?;
            }
        }
        Ok(())
    }

    /// Current operating mode.
    pub fn state(&self) -> LedState {
        self.state
    }

    /// Whether the output is currently driven high.
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Half period of the blink, in milliseconds.
    pub fn toggle_interval_ms(&self) -> u32 {
        self.toggle_interval_ms
    }

    /// Give back the pin.
    pub fn release(self) -> P {
        self.pin
    }

    fn write_on(&mut self) -> Result<(), DeviceError> {
        self.pin.set_high().map_err(DeviceError::pin)?;
        self.is_on = true;
        Ok(())
    }

    fn write_off(&mut self) -> Result<(), DeviceError> {
        self.pin.set_low().map_err(DeviceError::pin)?;
        self.is_on = false;
        Ok(())
    }
}
