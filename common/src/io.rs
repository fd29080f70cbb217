//! Interfaces to the hardware collaborators.
//!
//! The control core only ever sees these traits; the binaries supply DHT
//! pins and relay GPIOs on target, or simulations on the host.

use std::time::Duration;

use crate::types::Reading;

/// Supplies one reading per call. Repeatable, no side effects on the
/// control core.
pub trait SensorSource {
    fn read(&mut self) -> Reading;
}

/// Applies the decided actuator levels. Idempotent; called every cycle
/// with the current state, not just on edges.
pub trait OutputSink {
    fn apply(&mut self, heater_on: bool, fan_on: bool);
}

/// Best-effort state renderer. A missing or failing display must not be
/// able to stall the control loop, so there is nothing to return.
pub trait DisplaySink {
    fn render(&mut self, reading: &Reading, heater_on: bool, fan_on: bool);
}

/// Display sink for builds without a screen attached.
#[derive(Debug, Default)]
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    fn render(&mut self, _reading: &Reading, _heater_on: bool, _fan_on: bool) {}
}

/// Reads the sensor up to `max_attempts` times with a fixed synchronous
/// spacing, returning the first fully valid reading or, failing that, the
/// last attempt's (possibly partially invalid) result.
///
/// This is the only place the control cycle blocks, and it is bounded.
pub fn read_with_retries<S: SensorSource>(
    source: &mut S,
    max_attempts: u8,
    delay: Duration,
) -> Reading {
    let attempts = max_attempts.max(1);
    let mut reading = source.read();

    for _ in 1..attempts {
        if reading.is_fully_valid() {
            break;
        }
        std::thread::sleep(delay);
        reading = source.read();
    }

    reading
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed script of readings and counts the calls.
    struct ScriptedSensor {
        script: Vec<Reading>,
        calls: usize,
    }

    impl ScriptedSensor {
        fn new(script: Vec<Reading>) -> Self {
            Self { script, calls: 0 }
        }
    }

    impl SensorSource for ScriptedSensor {
        fn read(&mut self) -> Reading {
            let reading = self.script[self.calls.min(self.script.len() - 1)];
            self.calls += 1;
            reading
        }
    }

    fn valid() -> Reading {
        Reading::new(Some(21.0), Some(45.0))
    }

    #[test]
    fn stops_after_first_fully_valid_reading() {
        let mut sensor = ScriptedSensor::new(vec![valid()]);
        let reading = read_with_retries(&mut sensor, 3, Duration::ZERO);
        assert!(reading.is_fully_valid());
        assert_eq!(sensor.calls, 1);
    }

    #[test]
    fn retries_until_valid() {
        let mut sensor =
            ScriptedSensor::new(vec![Reading::invalid(), Reading::new(Some(21.0), None), valid()]);
        let reading = read_with_retries(&mut sensor, 3, Duration::ZERO);
        assert!(reading.is_fully_valid());
        assert_eq!(sensor.calls, 3);
    }

    #[test]
    fn returns_last_attempt_when_never_fully_valid() {
        let partial = Reading::new(None, Some(55.0));
        let mut sensor =
            ScriptedSensor::new(vec![Reading::invalid(), Reading::invalid(), partial]);
        let reading = read_with_retries(&mut sensor, 3, Duration::ZERO);
        assert_eq!(reading, partial);
        assert_eq!(sensor.calls, 3);
    }

    #[test]
    fn at_least_one_attempt_is_always_made() {
        let mut sensor = ScriptedSensor::new(vec![valid()]);
        let reading = read_with_retries(&mut sensor, 0, Duration::ZERO);
        assert!(reading.is_fully_valid());
        assert_eq!(sensor.calls, 1);
    }

    #[test]
    fn null_display_accepts_any_state() {
        let mut display = NullDisplay;
        display.render(&Reading::invalid(), false, false);
        display.render(&valid(), true, true);
    }
}
