//! The zone controller and the indicator panel it drives.

use embedded_hal::digital::OutputPin;
use rangewarn_devices::{Buzzer, DeviceError, DistanceSource, Led, MillisClock};

use crate::diagnostics::{DiagnosticSink, NoopSink, ZoneChange};
use crate::profile::{BuzzerProfile, ZoneProfiles};
use crate::settings::WarningSettings;
use crate::zone::{HazardThresholds, Zone};

/// Shortest poll period the controller accepts (ms).
pub const MIN_POLL_PERIOD_MS: u16 = 10;

/// Blink rate of the LED that marks the RED and ORANGE zones (Hz).
pub const ZONE_BLINK_HZ: f32 = 5.0;

/// The three zone LEDs and the buzzer.
///
/// All LEDs share one pin type; on targets with per-pin types, erase them
/// first (most HALs offer a degraded or `AnyPin` form).
pub struct Panel<L, B> {
    /// LED lit in the RED zone.
    pub red: Led<L>,
    /// LED lit in the ORANGE zone.
    pub orange: Led<L>,
    /// LED lit in the GREEN zone.
    pub green: Led<L>,
    /// Buzzer beeping the zone profile.
    pub buzzer: Buzzer<B>,
}

impl<L, B> Panel<L, B>
where
    L: OutputPin,
    B: OutputPin,
{
    /// Take the four output pins and drive them all low.
    pub fn new(red: L, orange: L, green: L, buzzer: B) -> Result<Self, DeviceError> {
        Ok(Self {
            red: Led::new(red)?,
            orange: Led::new(orange)?,
            green: Led::new(green)?,
            buzzer: Buzzer::new(buzzer)?,
        })
    }

    /// Advance every indicator timer.
    pub fn tick(&mut self, now_ms: u32) -> Result<(), DeviceError> {
        self.red.update(now_ms)?;
        self.orange.update(now_ms)?;
        self.green.update(now_ms)?;
        self.buzzer.update(now_ms)
    }

    /// Put the panel in the configuration for `zone`.
    ///
    /// | Zone   | Red        | Orange     | Green | Buzzer          |
    /// |--------|------------|------------|-------|-----------------|
    /// | Red    | blink 5 Hz | off        | off   | red profile     |
    /// | Orange | off        | blink 5 Hz | off   | orange profile  |
    /// | Green  | off        | off        | on    | green profile   |
    /// | None   | off        | off        | off   | muted           |
    pub fn show(&mut self, zone: Zone, profiles: &ZoneProfiles, now_ms: u32) -> Result<(), DeviceError> {
        match zone {
            Zone::Red => {
                self.red.blink(ZONE_BLINK_HZ, now_ms)?;
                self.orange.turn_off()?;
                self.green.turn_off()?;
                self.beep(profiles.red, now_ms)
            }
            Zone::Orange => {
                self.red.turn_off()?;
                self.orange.blink(ZONE_BLINK_HZ, now_ms)?;
                self.green.turn_off()?;
                self.beep(profiles.orange, now_ms)
            }
            Zone::Green => {
                self.red.turn_off()?;
                self.orange.turn_off()?;
                self.green.turn_on()?;
                self.beep(profiles.green, now_ms)
            }
            Zone::None => {
                self.red.turn_off()?;
                self.orange.turn_off()?;
                self.green.turn_off()?;
                self.buzzer.mute()
            }
        }
    }

    fn beep(&mut self, profile: BuzzerProfile, now_ms: u32) -> Result<(), DeviceError> {
        self.buzzer.set_pattern(profile.freq_hz, profile.duty, now_ms)
    }
}

/// Polls a distance source, tracks the hazard zone and drives the panel.
///
/// Call [`begin`](Self::begin) once, then [`update`](Self::update) as often as
/// the host loop allows. `update` never blocks except for the single sensor
/// sample it takes once per poll period.
pub struct WarningSystem<S, L, B, C, D = NoopSink> {
    sensor: S,
    panel: Panel<L, B>,
    clock: C,
    sink: D,
    settings: WarningSettings,
    zone: Zone,
    last_distance_cm: Option<f32>,
    last_poll_ms: u32,
    prev_poll_ms: u32,
    last_reaction_ms: u32,
}

impl<S, L, B, C, D> WarningSystem<S, L, B, C, D>
where
    S: DistanceSource,
    L: OutputPin,
    B: OutputPin,
    C: MillisClock,
    D: DiagnosticSink,
{
    /// Assemble a controller with default settings.
    ///
    /// # Arguments
    ///
    /// * `sensor`: Where distance readings come from.
    /// * `panel`: The indicators to drive.
    /// * `clock`: Free-running millisecond clock.
    /// * `sink`: Receiver of zone-change diagnostics.
    pub fn new(sensor: S, panel: Panel<L, B>, clock: C, sink: D) -> Self {
        Self {
            sensor,
            panel,
            clock,
            sink,
            settings: WarningSettings::default(),
            zone: Zone::None,
            last_distance_cm: None,
            last_poll_ms: 0,
            prev_poll_ms: 0,
            last_reaction_ms: 0,
        }
    }

    /// Show the NONE configuration and start the poll clock.
    ///
    /// The first sample is taken one full poll period from now.
    pub fn begin(&mut self) -> Result<(), DeviceError> {
        let now = self.clock.now_ms();
        self.panel.show(Zone::None, &self.settings.profiles, now)?;
        self.zone = Zone::None;
        self.last_poll_ms = now;
        self.prev_poll_ms = now;
        Ok(())
    }

    /// Run one tick of the control loop.
    ///
    /// Indicator timers advance on every call. Once per poll period the sensor
    /// is sampled, the zone re-evaluated, and on a change the panel is
    /// reconfigured and the reaction time recorded.
    pub fn update(&mut self) -> Result<(), DeviceError> {
        let now = self.clock.now_ms();
        self.panel.tick(now)?;

        if now.wrapping_sub(self.last_poll_ms) < u32::from(self.settings.poll_period_ms) {
            return Ok(());
        }

        self.prev_poll_ms = self.last_poll_ms;
        self.last_poll_ms = now;

        // One sample, no averaging: latency matters more than noise here.
        let reading = self.sensor.sample_averaged(1, 0);
        self.last_distance_cm = reading;

        let next = self.settings.thresholds.next_zone(self.zone, reading);
        if next == self.zone {
            return Ok(());
        }

        self.last_reaction_ms = self.last_poll_ms.wrapping_sub(self.prev_poll_ms);
        if self.settings.log_reactions {
            self.sink.zone_changed(&ZoneChange {
                zone: next,
                at_ms: self.last_poll_ms,
                reaction_ms: self.last_reaction_ms,
                distance_cm: reading,
            });
        }

        // The sample may have blocked; start the new patterns from the real time.
        let applied_at = self.clock.now_ms();
        self.panel.show(next, &self.settings.profiles, applied_at)?;
        self.zone = next;
        Ok(())
    }

    /// Set the RED/ORANGE and ORANGE/GREEN boundaries (cm).
    pub fn set_thresholds(&mut self, near_cm: u16, mid_cm: u16) {
        self.settings.thresholds.near_cm = near_cm;
        self.settings.thresholds.mid_cm = mid_cm;
    }

    /// Set the hysteresis margin (cm).
    pub fn set_hysteresis(&mut self, hysteresis_cm: u8) {
        self.settings.thresholds.hysteresis_cm = hysteresis_cm;
    }

    /// Set the poll period (ms), floored at [`MIN_POLL_PERIOD_MS`].
    pub fn set_poll_period_ms(&mut self, period_ms: u16) {
        self.settings.poll_period_ms = period_ms.max(MIN_POLL_PERIOD_MS);
    }

    /// Replace the beep profiles. Takes effect on the next zone change.
    pub fn set_buzzer_profiles(&mut self, red: BuzzerProfile, orange: BuzzerProfile, green: BuzzerProfile) {
        self.settings.profiles = ZoneProfiles { red, orange, green };
    }

    /// Enable or disable zone-change reports to the sink.
    pub fn set_log_reactions(&mut self, enabled: bool) {
        self.settings.log_reactions = enabled;
    }

    /// Replace every setting at once. The poll period floor still applies.
    pub fn apply_settings(&mut self, settings: WarningSettings) {
        self.settings = settings;
        self.set_poll_period_ms(settings.poll_period_ms);
    }

    /// Current zone.
    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// Reading from the most recent poll, `None` if it was invalid.
    pub fn last_distance_cm(&self) -> Option<f32> {
        self.last_distance_cm
    }

    /// Reaction time recorded at the last zone change (ms).
    pub fn last_reaction_ms(&self) -> u32 {
        self.last_reaction_ms
    }

    /// RED/ORANGE boundary (cm).
    pub fn near_threshold(&self) -> u16 {
        self.settings.thresholds.near_cm
    }

    /// ORANGE/GREEN boundary (cm).
    pub fn mid_threshold(&self) -> u16 {
        self.settings.thresholds.mid_cm
    }

    /// Zone bands and hysteresis.
    pub fn thresholds(&self) -> HazardThresholds {
        self.settings.thresholds
    }

    /// Effective poll period (ms).
    pub fn poll_period_ms(&self) -> u16 {
        self.settings.poll_period_ms
    }

    /// All current settings.
    pub fn settings(&self) -> &WarningSettings {
        &self.settings
    }

    /// The indicator panel.
    pub fn panel(&self) -> &Panel<L, B> {
        &self.panel
    }

    /// The distance source.
    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// The distance source, mutably (e.g. to retune range or sound speed).
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// The diagnostics sink.
    pub fn sink(&self) -> &D {
        &self.sink
    }
}
