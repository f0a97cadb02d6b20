//! HC-SR04 style trigger/echo distance sensor.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::DeviceError;
use crate::traits::pulse::PulseIn;
use crate::traits::source::DistanceSource;

/// Speed of sound at roughly 20 °C (cm/µs).
pub const DEFAULT_SOUND_SPEED_CM_PER_US: f32 = 0.0343;

/// Default nearest valid distance (cm). HC-SR04 class sensors are blind below ~2 cm.
pub const DEFAULT_MIN_RANGE_CM: u16 = 2;

/// Default farthest valid distance (cm).
pub const DEFAULT_MAX_RANGE_CM: u16 = 300;

/// Upper bound on the echo wait, whatever the configured range (µs).
pub const MAX_ECHO_TIMEOUT_US: u32 = 30_000;

/// Most samples a single averaged reading will take.
pub const MAX_SAMPLES: u8 = 10;

const TRIGGER_SETTLE_US: u32 = 2;
const TRIGGER_PULSE_US: u32 = 10;
const TIMEOUT_MARGIN: f32 = 1.2;

/// Driver for a trigger/echo time-of-flight ranger such as the HC-SR04.
///
/// Readings outside `[min_range_cm, max_range_cm]` and missing echoes are both
/// reported as `None`; the caller cannot and need not tell them apart.
pub struct UltrasonicSensor<T, E, D> {
    trigger: T,
    echo: E,
    delay: D,
    min_cm: u16,
    max_cm: u16,
    sound_cm_per_us: f32,
    timeout_us: u32,
}

impl<T, E, D> UltrasonicSensor<T, E, D>
where
    T: OutputPin,
    E: PulseIn,
    D: DelayNs,
{
    /// Create a sensor with the default 2–300 cm range and sound speed.
    ///
    /// # Arguments
    ///
    /// * `trigger`: Output wired to the sensor's trigger input.
    /// * `echo`: Pulse timer on the sensor's echo output.
    /// * `delay`: Microsecond-capable delay for the trigger pulse.
    pub fn new(trigger: T, echo: E, delay: D) -> Self {
        let mut sensor = Self {
            trigger,
            echo,
            delay,
            min_cm: DEFAULT_MIN_RANGE_CM,
            max_cm: DEFAULT_MAX_RANGE_CM,
            sound_cm_per_us: DEFAULT_SOUND_SPEED_CM_PER_US,
            timeout_us: 0,
        };
        sensor.recompute_timeout();
        sensor
    }

    /// Park the trigger line low. Call once during setup.
    ///
    /// Fails only if the HAL rejects the write.
    pub fn begin(&mut self) -> Result<(), DeviceError> {
        self.trigger.set_low().map_err(DeviceError::pin)
    }

    /// Set the valid distance band and derive the echo timeout from it.
    ///
    /// The timeout is the round trip to `max_cm` plus 20 %, never more than
    /// [`MAX_ECHO_TIMEOUT_US`].
    pub fn set_range(&mut self, min_cm: u16, max_cm: u16) {
        self.min_cm = min_cm;
        self.max_cm = max_cm;
        self.recompute_timeout();
    }

    /// Override the speed of sound, e.g. to compensate for temperature
    /// (`v ≈ 331.3 + 0.606·T` m/s, divided by 10⁴ for cm/µs).
    ///
    /// Values outside `(0.02, 0.05)` cm/µs are ignored. The echo timeout keeps
    /// the value derived at the last [`set_range`](Self::set_range).
    pub fn set_sound_speed(&mut self, cm_per_us: f32) {
        if cm_per_us > 0.02 && cm_per_us < 0.05 {
            self.sound_cm_per_us = cm_per_us;
        }
    }

    /// Fire one ping and convert the echo to centimetres.
    ///
    /// Blocks for at most [`timeout_us`](Self::timeout_us).
    pub fn sample_once(&mut self) -> Option<f32> {
        self.trigger_ping().ok()?;

        let echo_us = self.echo.pulse_high_us(self.timeout_us)?;
        if echo_us == 0 {
            return None;
        }

        // Half the round trip.
        let cm = (echo_us as f32 * 0.5) * self.sound_cm_per_us;
        if cm < self.min_cm as f32 || cm > self.max_cm as f32 {
            return None;
        }
        Some(cm)
    }

    /// Nearest valid distance (cm).
    pub fn min_range_cm(&self) -> u16 {
        self.min_cm
    }

    /// Farthest valid distance (cm).
    pub fn max_range_cm(&self) -> u16 {
        self.max_cm
    }

    /// Current echo wait bound (µs).
    pub fn timeout_us(&self) -> u32 {
        self.timeout_us
    }

    /// Speed of sound used for conversion (cm/µs).
    pub fn sound_speed_cm_per_us(&self) -> f32 {
        self.sound_cm_per_us
    }

    /// Give back the trigger, echo timer and delay.
    pub fn release(self) -> (T, E, D) {
        (self.trigger, self.echo, self.delay)
    }

    fn trigger_ping(&mut self) -> Result<(), T::Error> {
        self.trigger.set_low()?;
        self.delay.delay_us(TRIGGER_SETTLE_US);
        self.trigger.set_high()?;
        self.delay.delay_us(TRIGGER_PULSE_US);
        self.trigger.set_low()
    }

    fn recompute_timeout(&mut self) {
        let round_trip_us = (2.0 * self.max_cm as f32) / self.sound_cm_per_us;
        let timeout_us = (round_trip_us * TIMEOUT_MARGIN) as u32;
        self.timeout_us = timeout_us.min(MAX_ECHO_TIMEOUT_US);
    }
}

impl<T, E, D> DistanceSource for UltrasonicSensor<T, E, D>
where
    T: OutputPin,
    E: PulseIn,
    D: DelayNs,
{
    fn sample_averaged(&mut self, samples: u8, inter_sample_delay_ms: u16) -> Option<f32> {
        let samples = samples.clamp(1, MAX_SAMPLES);

        let mut sum = 0.0f32;
        let mut valid = 0u8;
        for i in 0..samples {
            if let Some(cm) = self.sample_once() {
                sum += cm;
                valid += 1;
            }
            if i + 1 < samples && inter_sample_delay_ms > 0 {
                self.delay.delay_ms(u32::from(inter_sample_delay_ms));
            }
        }

        if valid == 0 {
            return None;
        }
        Some(sum / valid as f32)
    }
}
