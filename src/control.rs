use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use rangewarn_devices::UltrasonicSensor;
use rangewarn_zones::{DiagnosticSink, Panel, WarningSystem, ZoneChange};
use spin_sleep::SpinSleeper;
use tracing::{error, info, warn};

use crate::blackboard::{raise_fault, record_zone, Blackboard, Line};
use crate::bus::Topic;
use crate::settings::AppConfig;
use crate::sim::{Scenario, SimClock, SimDelay, SimEcho, SimPin};

pub type SimSensor = UltrasonicSensor<SimPin, SimEcho, SimDelay>;
pub type SimSystem = WarningSystem<SimSensor, SimPin, SimPin, SimClock, BusSink>;

/// Forwards zone changes from the control thread onto the event bus.
pub struct BusSink {
    topic: Topic<ZoneChange>,
}

impl BusSink {
    pub fn new(topic: Topic<ZoneChange>) -> Self {
        Self { topic }
    }
}

impl DiagnosticSink for BusSink {
    fn zone_changed(&mut self, change: &ZoneChange) {
        self.topic.publish(*change);
    }
}

/// Wire the simulated board to a controller configured from `cfg`.
pub fn build_system(
    cfg: &AppConfig,
    clock: SimClock,
    bb: &Blackboard,
    zone_topic: Topic<ZoneChange>,
) -> anyhow::Result<SimSystem> {
    let scenario = Scenario::new(&cfg.simulation.scenario);
    info!(
        segments = cfg.simulation.scenario.len(),
        period_ms = scenario.period_ms(),
        "Scenario loaded"
    );
    let echo = SimEcho::new(scenario, &cfg.simulation);
    let mut sensor = UltrasonicSensor::new(SimPin::new(Line::Trigger, bb), echo, SimDelay);

    // Speed first: the echo timeout is derived from it when the range is set.
    let requested = cfg.sensor.sound_speed_cm_per_us;
    sensor.set_sound_speed(requested);
    if sensor.sound_speed_cm_per_us() != requested {
        warn!(
            requested,
            kept = sensor.sound_speed_cm_per_us(),
            "Sound speed outside (0.02, 0.05) cm/us, keeping the previous value"
        );
    }
    sensor.set_range(cfg.sensor.min_range_cm, cfg.sensor.max_range_cm);
    sensor
        .begin()
        .context("Failed to park the ultrasonic trigger line")?;
    info!(
        min_cm = sensor.min_range_cm(),
        max_cm = sensor.max_range_cm(),
        timeout_us = sensor.timeout_us(),
        "Sensor configured"
    );

    let panel = Panel::new(
        SimPin::new(Line::Red, bb),
        SimPin::new(Line::Orange, bb),
        SimPin::new(Line::Green, bb),
        SimPin::new(Line::Buzzer, bb),
    )
    .context("Failed to set up indicator panel")?;

    let mut system = WarningSystem::new(sensor, panel, clock, BusSink::new(zone_topic));
    system.apply_settings(cfg.warning);
    if system.poll_period_ms() != cfg.warning.poll_period_ms {
        warn!(
            requested = cfg.warning.poll_period_ms,
            effective = system.poll_period_ms(),
            "Poll period raised to the minimum"
        );
    }
    Ok(system)
}

/// Tick the controller every `tick` until `stop` is set.
///
/// Pin faults are logged and recorded on the blackboard; the loop carries on.
pub fn run(mut system: SimSystem, bb: Blackboard, stop: Arc<AtomicBool>, tick: Duration) {
    info!("Control thread started.");
    if let Err(e) = system.begin() {
        error!("Failed to start warning system: {}", e);
        raise_fault(&bb, &e.to_string());
    }

    let sleeper = SpinSleeper::new(1_000);
    while !stop.load(Ordering::Relaxed) {
        if let Err(e) = system.update() {
            error!("Control update failed: {}", e);
            raise_fault(&bb, &e.to_string());
        }
        record_zone(
            &bb,
            system.zone(),
            system.last_distance_cm(),
            system.last_reaction_ms(),
        );
        sleeper.sleep(tick);
    }
    info!("Control thread stopped.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackboard::snapshot;
    use crate::settings::{Segment, SimulationSettings};
    use rangewarn_zones::Zone;

    fn config(distance_cm: Option<f32>) -> AppConfig {
        AppConfig {
            simulation: SimulationSettings {
                scenario: vec![Segment {
                    hold_ms: 60_000,
                    distance_cm,
                }],
                ..SimulationSettings::default()
            },
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_build_applies_sensor_settings() {
        let mut cfg = config(Some(30.0));
        cfg.sensor.max_range_cm = 100;
        cfg.sensor.sound_speed_cm_per_us = 0.9;
        cfg.warning.poll_period_ms = 1;

        let bb: Blackboard = Arc::default();
        let system = build_system(&cfg, SimClock::new(0), &bb, Topic::new(4)).unwrap();
        assert_eq!(system.sensor().max_range_cm(), 100);
        assert_eq!(system.sensor().sound_speed_cm_per_us(), 0.0343);
        assert_eq!(system.poll_period_ms(), 10);
    }

    #[test]
    fn test_zone_change_reaches_bus_and_blackboard() {
        let cfg = config(Some(30.0));
        let bb: Blackboard = Arc::default();
        let topic = Topic::new(8);
        let mut rx = topic.subscribe();
        let system = build_system(&cfg, SimClock::new(0), &bb, topic).unwrap();

        let stop = Arc::new(AtomicBool::new(false));
        let handle = std::thread::spawn({
            let bb = bb.clone();
            let stop = stop.clone();
            move || run(system, bb, stop, Duration::from_millis(1))
        });
        std::thread::sleep(Duration::from_millis(300));
        stop.store(true, Ordering::Relaxed);
        handle.join().unwrap();

        let change = rx.try_recv().unwrap();
        assert_eq!(change.zone, Zone::Red);
        let state = snapshot(&bb);
        assert_eq!(state.zone, Zone::Red);
        assert!(state.rising_edges(Line::Buzzer) >= 1);
        assert!(state.rising_edges(Line::Trigger) >= 1);
        assert!(!state.level(Line::Green));
        assert!(state.faults.is_empty());
    }
}
