use crate::{
    config::Thresholds,
    types::{Device, Mode, Reading, SetpointField},
};

/// Hysteresis controller for one heater and one fan.
///
/// Owns the actuator state, the thresholds, and the latest sensor reading.
/// Actuator levels are edge-triggered: they persist across cycles and only
/// move when a threshold crossing (or an explicit command) says so. There
/// are no error states — invalid readings and unknown command targets
/// degrade to "hold what we have".
#[derive(Debug, Clone)]
pub struct ControlEngine {
    thresholds: Thresholds,
    mode: Mode,
    heater_on: bool,
    fan_on: bool,
    latest: Reading,
}

impl ControlEngine {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            mode: Mode::Auto,
            heater_on: false,
            fan_on: false,
            latest: Reading::invalid(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn heater_on(&self) -> bool {
        self.heater_on
    }

    pub fn fan_on(&self) -> bool {
        self.fan_on
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// The reading recorded by the most recent [`update`](Self::update),
    /// kept for status replies and the display.
    pub fn latest_reading(&self) -> &Reading {
        &self.latest
    }

    /// Runs one control cycle against a fresh reading.
    ///
    /// In AUTO mode each actuator follows its own hysteresis band, and an
    /// invalid field leaves its actuator at the last known level. MANUAL
    /// mode freezes both actuators until an explicit command moves them.
    pub fn update(&mut self, reading: Reading) {
        self.latest = reading;

        if self.mode != Mode::Auto {
            return;
        }

        if reading.temperature_valid {
            // Both edges are checked every cycle; with a sane band
            // (temp_on < temp_off) at most one can fire.
            if !self.heater_on && reading.temperature_c < self.thresholds.temp_on_c {
                self.heater_on = true;
            }
            if self.heater_on && reading.temperature_c >= self.thresholds.temp_off_c {
                self.heater_on = false;
            }
        }

        if reading.humidity_valid {
            if !self.fan_on && reading.humidity_pct >= self.thresholds.hum_on_pct {
                self.fan_on = true;
            }
            if self.fan_on && reading.humidity_pct < self.thresholds.hum_off_pct {
                self.fan_on = false;
            }
        }
    }

    /// Unconditional mode overwrite. Actuator levels are left alone:
    /// AUTO→MANUAL freezes them where they are, MANUAL→AUTO resumes
    /// hysteresis from whatever was last set (which may flip them on the
    /// next cycle if the reading sits outside the band).
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Writes one actuator directly and forces MANUAL mode — an explicit
    /// actuator command always implies a manual override. An unknown
    /// device name changes nothing, mode included.
    pub fn set_actuator(&mut self, device: Device, on: bool) {
        match device {
            Device::Heater => self.heater_on = on,
            Device::Fan => self.fan_on = on,
            Device::Unknown => return,
        }
        self.mode = Mode::Manual;
    }

    /// Writes one threshold field. Unknown field names are ignored; values
    /// are taken as-is, with no bound or ordering check.
    pub fn set_threshold(&mut self, field: SetpointField, value: f32) {
        match field {
            SetpointField::TempOn => self.thresholds.temp_on_c = value,
            SetpointField::TempOff => self.thresholds.temp_off_c = value,
            SetpointField::HumOn => self.thresholds.hum_on_pct = value,
            SetpointField::HumOff => self.thresholds.hum_off_pct = value,
            SetpointField::Unknown => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ControlEngine {
        ControlEngine::new(Thresholds::default())
    }

    fn reading(temp: f32, hum: f32) -> Reading {
        Reading::new(Some(temp), Some(hum))
    }

    #[test]
    fn starts_in_auto_with_everything_off() {
        let engine = engine();
        assert_eq!(engine.mode(), Mode::Auto);
        assert!(!engine.heater_on());
        assert!(!engine.fan_on());
        assert!(!engine.latest_reading().is_fully_valid());
    }

    #[test]
    fn heater_follows_hysteresis_band() {
        let mut engine = engine();

        // Below temp_on: heater turns on.
        engine.update(reading(18.0, 50.0));
        assert!(engine.heater_on());

        // Inside the band: stays on.
        engine.update(reading(21.0, 50.0));
        assert!(engine.heater_on());
        engine.update(reading(23.9, 50.0));
        assert!(engine.heater_on());

        // At temp_off: turns off, and stays off back inside the band.
        engine.update(reading(24.0, 50.0));
        assert!(!engine.heater_on());
        engine.update(reading(21.0, 50.0));
        assert!(!engine.heater_on());
    }

    #[test]
    fn fan_follows_inverted_hysteresis_band() {
        let mut engine = engine();
        engine.set_threshold(SetpointField::HumOn, 60.0);
        engine.set_threshold(SetpointField::HumOff, 50.0);

        engine.update(reading(22.0, 60.0));
        assert!(engine.fan_on());

        engine.update(reading(22.0, 55.0));
        assert!(engine.fan_on());

        engine.update(reading(22.0, 49.9));
        assert!(!engine.fan_on());

        engine.update(reading(22.0, 55.0));
        assert!(!engine.fan_on());
    }

    #[test]
    fn invalid_temperature_holds_heater_state() {
        let mut engine = engine();
        engine.update(reading(18.0, 50.0));
        assert!(engine.heater_on());

        // Temperature read failed; heater must hold even though the stale
        // field happens to carry a value past temp_off.
        engine.update(Reading {
            temperature_c: 99.0,
            temperature_valid: false,
            humidity_pct: 50.0,
            humidity_valid: true,
        });
        assert!(engine.heater_on());

        // Same with the heater off.
        engine.update(reading(25.0, 50.0));
        assert!(!engine.heater_on());
        engine.update(Reading::new(None, Some(50.0)));
        assert!(!engine.heater_on());
    }

    #[test]
    fn invalid_humidity_holds_fan_state() {
        let mut engine = engine();
        engine.update(reading(22.0, 70.0));
        assert!(engine.fan_on());

        engine.update(Reading::new(Some(22.0), None));
        assert!(engine.fan_on());
    }

    #[test]
    fn manual_mode_freezes_actuators() {
        let mut engine = engine();
        engine.update(reading(18.0, 70.0));
        assert!(engine.heater_on());
        assert!(engine.fan_on());

        engine.set_mode(Mode::Manual);
        engine.update(reading(30.0, 10.0));
        engine.update(reading(30.0, 10.0));
        assert!(engine.heater_on());
        assert!(engine.fan_on());
    }

    #[test]
    fn returning_to_auto_resumes_from_frozen_levels() {
        let mut engine = engine();
        engine.set_actuator(Device::Heater, true);
        assert_eq!(engine.mode(), Mode::Manual);

        // Back in AUTO, a reading past temp_off flips the heater on the
        // very next cycle. Intended transition behavior.
        engine.set_mode(Mode::Auto);
        engine.update(reading(25.0, 50.0));
        assert!(!engine.heater_on());
    }

    #[test]
    fn set_actuator_forces_manual_even_from_auto() {
        let mut engine = engine();
        assert_eq!(engine.mode(), Mode::Auto);

        engine.set_actuator(Device::Fan, true);
        assert!(engine.fan_on());
        assert_eq!(engine.mode(), Mode::Manual);

        engine.set_mode(Mode::Manual);
        engine.set_actuator(Device::Heater, true);
        assert_eq!(engine.mode(), Mode::Manual);
        assert!(engine.heater_on());
    }

    #[test]
    fn unknown_device_is_a_complete_no_op() {
        let mut engine = engine();
        engine.set_actuator(Device::Unknown, true);
        assert_eq!(engine.mode(), Mode::Auto);
        assert!(!engine.heater_on());
        assert!(!engine.fan_on());
    }

    #[test]
    fn unknown_setpoint_field_is_ignored() {
        let mut engine = engine();
        engine.set_threshold(SetpointField::Unknown, 99.0);
        assert_eq!(*engine.thresholds(), Thresholds::default());
    }

    #[test]
    fn out_of_order_thresholds_are_accepted() {
        // temp_on above temp_off is legal; both edges fire in one cycle and
        // the later (off) edge wins, so the heater chatters off.
        let mut engine = engine();
        engine.set_threshold(SetpointField::TempOn, 30.0);
        engine.set_threshold(SetpointField::TempOff, 20.0);

        engine.update(reading(25.0, 50.0));
        assert!(!engine.heater_on());
    }
}
