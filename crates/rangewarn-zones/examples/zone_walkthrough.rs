use core::cell::Cell;
use core::convert::Infallible;
use std::collections::VecDeque;

use embedded_hal::digital::{ErrorType, OutputPin};
use rangewarn_devices::{DistanceSource, MillisClock};
use rangewarn_zones::*;

/// Output pin that does nothing; the walkthrough prints device state instead.
struct NullPin;

impl ErrorType for NullPin {
    type Error = Infallible;
}

impl OutputPin for NullPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

struct StepClock<'a>(&'a Cell<u32>);

impl MillisClock for StepClock<'_> {
    fn now_ms(&self) -> u32 {
        self.0.get()
    }
}

struct Walk(VecDeque<Option<f32>>);

impl DistanceSource for Walk {
    fn sample_averaged(&mut self, _samples: u8, _inter_sample_delay_ms: u16) -> Option<f32> {
        self.0.pop_front().flatten()
    }
}

struct PrintSink;

impl DiagnosticSink for PrintSink {
    fn zone_changed(&mut self, change: &ZoneChange) {
        println!(
            "  ZONE_CHANGE to {} ({}) at ms={} | reaction_ms={}",
            change.zone.id(),
            change.zone,
            change.at_ms,
            change.reaction_ms
        );
    }
}

fn main() {
    // Someone walks up to the sensor, stops close, then steps away and out of range.
    let walk = [
        Some(180.0),
        Some(120.0),
        Some(97.0),
        Some(93.0),
        Some(70.0),
        Some(52.0),
        Some(44.0),
        Some(48.0),
        Some(56.0),
        Some(110.0),
        None,
    ];
    let poll_period_ms = 50;

    let now = Cell::new(0u32);
    let panel = match Panel::new(NullPin, NullPin, NullPin, NullPin) {
        Ok(panel) => panel,
        Err(e) => {
            eprintln!("Failed to set up the panel: {}", e);
            return;
        }
    };
    let mut system = WarningSystem::new(
        Walk(walk.iter().copied().collect()),
        panel,
        StepClock(&now),
        PrintSink,
    );
    system.set_poll_period_ms(poll_period_ms);

    println!("Initializing walkthrough...");
    println!("  Thresholds:  {:?}", system.thresholds());
    println!("  Poll period: {} ms", system.poll_period_ms());
    println!("  Readings:    {}", walk.len());

    if let Err(e) = system.begin() {
        eprintln!("Failed to start: {}", e);
        return;
    }

    println!("\nWalking...");
    for (i, reading) in walk.iter().enumerate() {
        now.set((i as u32 + 1) * u32::from(poll_period_ms));
        if let Err(e) = system.update() {
            eprintln!("Error during step {}: {}", i + 1, e);
            break;
        }
        let panel = system.panel();
        println!(
            "Step {:>2}: d = {:>8} -> {:<6} red={:?} orange={:?} green={:?} buzzer={:?}",
            i + 1,
            reading.map_or("invalid".to_string(), |d| format!("{:.1} cm", d)),
            system.zone().as_str(),
            panel.red.state(),
            panel.orange.state(),
            panel.green.state(),
            panel.buzzer.state(),
        );
    }

    println!("\nWalkthrough complete.");
    println!("Final zone: {}", system.zone());
}
