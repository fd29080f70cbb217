use std::path::Path;

use serde::{Deserialize, Serialize};

/// Hysteresis thresholds. The controller expects `temp_on_c < temp_off_c`
/// and `hum_off_pct <= hum_on_pct`, but nothing enforces it: the setpoint
/// command accepts any float, and a degenerate band just chatters or sticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub temp_on_c: f32,
    pub temp_off_c: f32,
    pub hum_on_pct: f32,
    pub hum_off_pct: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temp_on_c: 20.0,
            temp_off_c: 24.0,
            hum_on_pct: 60.0,
            hum_off_pct: 60.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    pub cycle_interval_ms: u64,
    pub sensor_retry_attempts: u8,
    pub sensor_retry_delay_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            cycle_interval_ms: 2_000,
            sensor_retry_attempts: 3,
            sensor_retry_delay_ms: 150,
        }
    }
}

/// Startup configuration. Loaded once at boot and never written back;
/// setpoint changes made over the protocol live only for the process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub thresholds: Thresholds,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl RuntimeConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_match_device_firmware() {
        let thresholds = Thresholds::default();
        assert_eq!(thresholds.temp_on_c, 20.0);
        assert_eq!(thresholds.temp_off_c, 24.0);
        assert_eq!(thresholds.hum_on_pct, 60.0);
        assert_eq!(thresholds.hum_off_pct, 60.0);

        let controller = ControllerConfig::default();
        assert_eq!(controller.cycle_interval_ms, 2_000);
        assert_eq!(controller.sensor_retry_attempts, 3);
    }

    #[test]
    fn partial_config_file_fills_in_defaults() {
        let parsed: RuntimeConfig =
            serde_json::from_str(r#"{"thresholds":{"temp_on_c":18.0,"temp_off_c":22.0,"hum_on_pct":65.0,"hum_off_pct":55.0}}"#)
                .unwrap();
        assert_eq!(parsed.thresholds.temp_on_c, 18.0);
        assert_eq!(parsed.controller, ControllerConfig::default());
    }
}
