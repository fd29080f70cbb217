use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    Auto,
    Manual,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "AUTO",
            Self::Manual => "MANUAL",
        }
    }

    /// Parses an AUTO/MANUAL token, case-insensitively. Anything else is
    /// rejected so the command layer can drop the line.
    pub fn parse(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("AUTO") {
            Some(Self::Auto)
        } else if token.eq_ignore_ascii_case("MANUAL") {
            Some(Self::Manual)
        } else {
            None
        }
    }
}

/// Actuator addressed by a `SET` command. Unknown names are kept as an
/// explicit variant so the engine can no-op on them instead of the parser
/// rejecting the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Heater,
    Fan,
    Unknown,
}

impl Device {
    pub fn parse(token: &str) -> Self {
        if token.eq_ignore_ascii_case("heater") {
            Self::Heater
        } else if token.eq_ignore_ascii_case("fan") {
            Self::Fan
        } else {
            Self::Unknown
        }
    }
}

/// Threshold field addressed by a `SETPT` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetpointField {
    TempOn,
    TempOff,
    HumOn,
    HumOff,
    Unknown,
}

impl SetpointField {
    pub fn parse(token: &str) -> Self {
        if token.eq_ignore_ascii_case("temp_on") {
            Self::TempOn
        } else if token.eq_ignore_ascii_case("temp_off") {
            Self::TempOff
        } else if token.eq_ignore_ascii_case("hum_on") {
            Self::HumOn
        } else if token.eq_ignore_ascii_case("hum_off") {
            Self::HumOff
        } else {
            Self::Unknown
        }
    }
}

/// One sensor sample. Each field carries its own validity flag; an invalid
/// field holds no meaningful value and must never drive a decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub temperature_c: f32,
    pub temperature_valid: bool,
    pub humidity_pct: f32,
    pub humidity_valid: bool,
}

impl Reading {
    pub fn new(temperature_c: Option<f32>, humidity_pct: Option<f32>) -> Self {
        Self {
            temperature_c: temperature_c.unwrap_or(0.0),
            temperature_valid: temperature_c.is_some(),
            humidity_pct: humidity_pct.unwrap_or(0.0),
            humidity_valid: humidity_pct.is_some(),
        }
    }

    /// A reading with both fields failed, used before the first sensor
    /// cycle and when every read attempt comes back empty.
    pub fn invalid() -> Self {
        Self::new(None, None)
    }

    pub fn is_fully_valid(&self) -> bool {
        self.temperature_valid && self.humidity_valid
    }
}
