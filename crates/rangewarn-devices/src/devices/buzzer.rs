//! Pattern buzzer indicator.

use embedded_hal::digital::OutputPin;

use crate::clamp_indicator_hz;
use crate::error::DeviceError;

/// Lowest accepted duty fraction for a beep pattern.
pub const MIN_DUTY: f32 = 0.05;

/// Highest accepted duty fraction for a beep pattern.
pub const MAX_DUTY: f32 = 0.95;

/// Operating mode of a [`Buzzer`].
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerState {
    /// Silent.
    Off,
    /// Continuous tone.
    On,
    /// Beeping with independent on and off phases.
    Pattern,
}

/// An active buzzer switched on and off to form beep patterns.
///
/// Unlike [`Led`](crate::Led), a pattern has separate on and off durations so
/// the duty cycle can differ from 50 %.
pub struct Buzzer<P> {
    pin: P,
    state: BuzzerState,
    is_on: bool,
    on_interval_ms: u32,
    off_interval_ms: u32,
    phase_start_ms: u32,
}

impl<P: OutputPin> Buzzer<P> {
    /// Take ownership of `pin` and silence it. Intervals start at 500/500 ms.
    pub fn new(pin: P) -> Result<Self, DeviceError> {
        let mut buzzer = Self {
            pin,
            state: BuzzerState::Off,
            is_on: false,
            on_interval_ms: 500,
            off_interval_ms: 500,
            phase_start_ms: 0,
        };
        buzzer.write_off()?;
        Ok(buzzer)
    }

    /// Sound a continuous tone.
    pub fn turn_on(&mut self) -> Result<(), DeviceError> {
        self.state = BuzzerState::On;
        self.write_on()
    }

    /// Silence the buzzer.
    pub fn turn_off(&mut self) -> Result<(), DeviceError> {
        self.state = BuzzerState::Off;
        self.write_off()
    }

    /// Alias for [`turn_off`](Self::turn_off).
    pub fn mute(&mut self) -> Result<(), DeviceError> {
        self.turn_off()
    }

    /// Start beeping `freq_hz` times per second, on for `duty` of each period.
    ///
    /// # Arguments
    ///
    /// * `freq_hz`: Beeps per second, clamped to 0.5–50.
    /// * `duty`: Fraction of the period spent on, clamped to 0.05–0.95.
    /// * `now_ms`: Current time; the pattern starts here in its on phase.
    pub fn set_pattern(&mut self, freq_hz: f32, duty: f32, now_ms: u32) -> Result<(), DeviceError> {
        let freq_hz = clamp_indicator_hz(freq_hz);
        let duty = if duty.is_nan() {
            MIN_DUTY
        } else {
            duty.clamp(MIN_DUTY, MAX_DUTY)
        };

        self.on_interval_ms = (1000.0 * duty / freq_hz) as u32;
        self.off_interval_ms = (1000.0 * (1.0 - duty) / freq_hz) as u32;

        self.state = BuzzerState::Pattern;
        self.phase_start_ms = now_ms;
        self.write_on()
    }

    /// Advance the pattern timer. A no-op unless a pattern is running.
    pub fn update(&mut self, now_ms: u32) -> Result<(), DeviceError> {
        if self.state != BuzzerState::Pattern {
            return Ok(());
        }

        let elapsed = now_ms.wrapping_sub(self.phase_start_ms);
        if self.is_on {
            if elapsed >= self.on_interval_ms {
                self.phase_start_ms = now_ms;
                self.write_off()?;
            }
        } else if elapsed >= self.off_interval_ms {
            self.phase_start_ms = now_ms;
            self.write_on()?;
        }
        Ok(())
    }

    /// Current operating mode.
    pub fn state(&self) -> BuzzerState {
        self.state
    }

    /// Whether the output is currently driven high.
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Length of the on phase, in milliseconds.
    pub fn on_interval_ms(&self) -> u32 {
        self.on_interval_ms
    }

    /// Length of the off phase, in milliseconds.
    pub fn off_interval_ms(&self) -> u32 {
        self.off_interval_ms
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

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Pin that remembers its level so tests can ignore the exact write sequence.
    #[derive(Clone, Default)]
    struct LevelPin(Rc<Cell<bool>>);

    impl embedded_hal::digital::ErrorType for LevelPin {
        type Error = Infallible;
    }

    impl OutputPin for LevelPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0.set(true);
            Ok(())
        }
    }

    #[test]
    fn test_pattern_intervals_symmetric() {
        let mut buzzer = Buzzer::new(LevelPin::default()).unwrap();
        buzzer.set_pattern(10.0, 0.5, 0).unwrap();
        assert_eq!(buzzer.on_interval_ms(), 50);
        assert_eq!(buzzer.off_interval_ms(), 50);
    }

    #[test]
    fn test_pattern_intervals_short_duty() {
        let mut buzzer = Buzzer::new(LevelPin::default()).unwrap();
        buzzer.set_pattern(1.0, 0.1, 0).unwrap();
        assert_eq!(buzzer.on_interval_ms(), 100);
        assert_eq!(buzzer.off_interval_ms(), 900);
    }

    #[test]
    fn test_pattern_inputs_are_clamped() {
        let mut buzzer = Buzzer::new(LevelPin::default()).unwrap();
        buzzer.set_pattern(100.0, 1.0, 0).unwrap();
        // 50 Hz, 95 % duty
        assert_eq!(buzzer.on_interval_ms(), 19);
        assert!(buzzer.off_interval_ms() <= 1);

        buzzer.set_pattern(0.0, 0.0, 0).unwrap();
        // 0.5 Hz, 5 % duty
        assert_eq!(buzzer.on_interval_ms(), 100);
        assert_eq!(buzzer.off_interval_ms(), 1_900);
    }

    #[test]
    fn test_pattern_starts_on_and_alternates_phases() {
        let level = LevelPin::default();
        let mut buzzer = Buzzer::new(level.clone()).unwrap();
        buzzer.set_pattern(1.0, 0.1, 5_000).unwrap();
        assert_eq!(buzzer.state(), BuzzerState::Pattern);
        assert!(buzzer.is_on());
        assert!(level.0.get());

        buzzer.update(5_099).unwrap();
        assert!(buzzer.is_on());
        buzzer.update(5_100).unwrap();
        assert!(!buzzer.is_on());
        assert!(!level.0.get());

        // Off phase runs its own 900 ms from the last flip.
        buzzer.update(5_999).unwrap();
        assert!(!buzzer.is_on());
        buzzer.update(6_000).unwrap();
        assert!(buzzer.is_on());
    }

    #[test]
    fn test_pattern_survives_clock_wrap() {
        let mut buzzer = Buzzer::new(LevelPin::default()).unwrap();
        buzzer.set_pattern(10.0, 0.5, u32::MAX - 9).unwrap();
        buzzer.update(39).unwrap();
        assert!(buzzer.is_on());
        buzzer.update(40).unwrap();
        assert!(!buzzer.is_on());
    }

    #[test]
    fn test_mute_stops_pattern() {
        let mut pin = PinMock::new(&[
            Transaction::set(State::Low),
            Transaction::set(State::High),
            Transaction::set(State::Low),
        ]);
        let mut buzzer = Buzzer::new(pin.clone()).unwrap();
        buzzer.set_pattern(4.0, 0.3, 0).unwrap();
        buzzer.mute().unwrap();
        assert_eq!(buzzer.state(), BuzzerState::Off);
        assert!(!buzzer.is_on());
        // No writes once muted.
        buzzer.update(10_000).unwrap();
        pin.done();
    }

    #[test]
    fn test_turn_on_holds_tone() {
        let mut buzzer = Buzzer::new(LevelPin::default()).unwrap();
        buzzer.turn_on().unwrap();
        buzzer.update(1_000_000).unwrap();
        assert_eq!(buzzer.state(), BuzzerState::On);
        assert!(buzzer.is_on());
    }
}
