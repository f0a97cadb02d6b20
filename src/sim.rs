//! Simulated board: clock, output pins, delay and an echo line driven by a
//! scripted scene.

use std::convert::Infallible;
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rangewarn_devices::devices::ultrasonic::DEFAULT_SOUND_SPEED_CM_PER_US;
use rangewarn_devices::{MicrosClock, MillisClock, PulseIn};

use crate::blackboard::{set_level, Blackboard, Line};
use crate::settings::{Segment, SimulationSettings};

/// Wall-clock counter that starts at `offset_ms` and wraps like an MCU tick counter.
#[derive(Debug, Clone, Copy)]
pub struct SimClock {
    start: Instant,
    offset_ms: u32,
}

impl SimClock {
    pub fn new(offset_ms: u32) -> Self {
        Self {
            start: Instant::now(),
            offset_ms,
        }
    }
}

impl MillisClock for SimClock {
    fn now_ms(&self) -> u32 {
        let elapsed = self.start.elapsed().as_millis() as u32;
        self.offset_ms.wrapping_add(elapsed)
    }
}

impl MicrosClock for SimClock {
    fn now_us(&self) -> u32 {
        let offset_us = u64::from(self.offset_ms) * 1_000;
        let elapsed = self.start.elapsed().as_micros() as u64;
        offset_us.wrapping_add(elapsed) as u32
    }
}

/// Output line that mirrors its level onto the blackboard.
#[derive(Debug, Clone)]
pub struct SimPin {
    line: Line,
    bb: Blackboard,
}

impl SimPin {
    pub fn new(line: Line, bb: &Blackboard) -> Self {
        Self {
            line,
            bb: bb.clone(),
        }
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        set_level(&self.bb, self.line, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        set_level(&self.bb, self.line, true);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SimDelay;

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        spin_sleep::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

/// Looping sequence of held distances.
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    segments: Vec<Segment>,
    period_ms: u64,
}

impl Scenario {
    pub fn new(segments: &[Segment]) -> Self {
        let segments: Vec<Segment> = segments.iter().copied().filter(|s| s.hold_ms > 0).collect();
        let period_ms = segments.iter().map(|s| u64::from(s.hold_ms)).sum();
        Self {
            segments,
            period_ms,
        }
    }

    /// Length of one pass through the scene.
    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Distance in the beam `elapsed_ms` after the scene started. An empty
    /// scene has nothing in the beam.
    pub fn distance_at(&self, elapsed_ms: u64) -> Option<f32> {
        if self.period_ms == 0 {
            return None;
        }
        let mut t = elapsed_ms % self.period_ms;
        for segment in &self.segments {
            let hold = u64::from(segment.hold_ms);
            if t < hold {
                return segment.distance_cm;
            }
            t -= hold;
        }
        None
    }
}

/// Echo line of a simulated ranger looking at the scenario.
///
/// The echo width follows the physical speed of sound whatever the driver
/// is calibrated to, so a miscalibrated driver reads a skewed distance.
pub struct SimEcho {
    scenario: Scenario,
    started: Instant,
    rng: StdRng,
    noise_cm: f32,
    dropout_probability: f64,
}

impl SimEcho {
    pub fn new(scenario: Scenario, settings: &SimulationSettings) -> Self {
        Self {
            scenario,
            started: Instant::now(),
            rng: StdRng::seed_from_u64(settings.seed),
            noise_cm: settings.noise_cm,
            dropout_probability: settings.dropout_probability,
        }
    }

    /// Round-trip echo width (µs) for the object in the beam right now,
    /// `None` if there is nothing to reflect.
    fn echo_width_us(&mut self) -> Option<u32> {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        let distance = self.scenario.distance_at(elapsed_ms)?;
        if self.rng.random_bool(self.dropout_probability) {
            return None;
        }

        let noise = if self.noise_cm > 0.0 {
            self.rng.random_range(-self.noise_cm..=self.noise_cm)
        } else {
            0.0
        };
        let distance = (distance + noise).max(0.0);
        Some((2.0 * distance / DEFAULT_SOUND_SPEED_CM_PER_US).round() as u32)
    }
}

impl PulseIn for SimEcho {
    fn pulse_high_us(&mut self, timeout_us: u32) -> Option<u32> {
        match self.echo_width_us() {
            Some(width) if width <= timeout_us => {
                spin_sleep::sleep(Duration::from_micros(u64::from(width)));
                Some(width)
            }
            _ => {
                spin_sleep::sleep(Duration::from_micros(u64::from(timeout_us)));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn seg(hold_ms: u32, distance_cm: Option<f32>) -> Segment {
        Segment {
            hold_ms,
            distance_cm,
        }
    }

    fn quiet(seed: u64) -> SimulationSettings {
        SimulationSettings {
            seed,
            ..SimulationSettings::default()
        }
    }

    #[test]
    fn test_scenario_lookup_loops() {
        let scenario = Scenario::new(&[seg(100, Some(80.0)), seg(50, None), seg(0, Some(1.0))]);
        assert_eq!(scenario.period_ms(), 150);
        assert_eq!(scenario.distance_at(0), Some(80.0));
        assert_eq!(scenario.distance_at(99), Some(80.0));
        assert_eq!(scenario.distance_at(100), None);
        assert_eq!(scenario.distance_at(150), Some(80.0));
        assert_eq!(scenario.distance_at(1_549), Some(80.0));
        assert_eq!(scenario.distance_at(1_649), None);
    }

    #[test]
    fn test_empty_scenario_has_nothing_in_beam() {
        assert_eq!(Scenario::default().distance_at(1_000), None);
    }

    #[test]
    fn test_clock_wraps_from_offset() {
        let clock = SimClock::new(u32::MAX);
        let now = clock.now_ms();
        // Either still at the offset or already wrapped to a small value.
        assert!(now == u32::MAX || now < 1_000);
    }

    #[test]
    fn test_micros_follow_millis_offset() {
        let clock = SimClock::new(2_000);
        let us = clock.now_us();
        assert!((2_000_000..2_100_000).contains(&us), "us = {}", us);
    }

    #[test]
    fn test_echo_width_matches_distance() {
        let mut echo = SimEcho::new(Scenario::new(&[seg(60_000, Some(100.0))]), &quiet(1));
        let width = echo.pulse_high_us(30_000).unwrap();
        // 200 cm round trip at 0.0343 cm/µs
        assert!((5_830..=5_832).contains(&width), "width = {}", width);
    }

    #[test]
    fn test_echo_beyond_timeout_is_lost() {
        let mut echo = SimEcho::new(Scenario::new(&[seg(60_000, Some(250.0))]), &quiet(1));
        assert_eq!(echo.pulse_high_us(1_000), None);
    }

    #[test]
    fn test_dropout_always_loses_echo() {
        let settings = SimulationSettings {
            dropout_probability: 1.0,
            ..quiet(3)
        };
        let mut echo = SimEcho::new(Scenario::new(&[seg(60_000, Some(20.0))]), &settings);
        assert_eq!(echo.pulse_high_us(2_000), None);
    }

    #[test]
    fn test_noise_stays_within_bound() {
        let settings = SimulationSettings {
            noise_cm: 1.0,
            ..quiet(42)
        };
        let mut echo = SimEcho::new(Scenario::new(&[seg(60_000, Some(10.0))]), &settings);
        for _ in 0..20 {
            let width = echo.pulse_high_us(30_000).unwrap() as f32;
            let cm = width * 0.5 * DEFAULT_SOUND_SPEED_CM_PER_US;
            assert!((8.9..=11.1).contains(&cm), "cm = {}", cm);
        }
    }

    #[test]
    fn test_sim_pin_mirrors_level() {
        let bb: Blackboard = Arc::default();
        let mut pin = SimPin::new(Line::Green, &bb);
        pin.set_high().unwrap();
        assert!(crate::blackboard::snapshot(&bb).level(Line::Green));
        pin.set_low().unwrap();
        assert!(!crate::blackboard::snapshot(&bb).level(Line::Green));
    }
}
