//! Line-oriented command protocol.
//!
//! One command per line, comma-delimited, keyword first. Every recognized
//! command is acknowledged with a single `STATUS,...` line; malformed lines
//! are dropped without a reply. That permissiveness is deliberate: the
//! serial peer retries with `GET`, so a diagnostic channel would only add
//! protocol surface.

use std::mem;

use crate::{
    engine::ControlEngine,
    types::{Device, Mode, SetpointField},
};

/// Accumulation cap for one line. Input past this point is dropped on the
/// floor until a terminator shows up; the truncated line still dispatches.
pub const MAX_LINE_LEN: usize = 200;

/// A decoded command line. `Invalid` covers everything the grammar rejects:
/// unknown keywords, wrong field counts, bad mode tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Get,
    Mode(Mode),
    SetActuator(Device, bool),
    SetPoint(SetpointField, f32),
    Invalid,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let mut fields = line.split(',');
        let keyword = fields.next().unwrap_or("");

        if keyword.eq_ignore_ascii_case("GET") {
            match fields.next() {
                None => Self::Get,
                Some(_) => Self::Invalid,
            }
        } else if keyword.eq_ignore_ascii_case("MODE") {
            match (fields.next().and_then(Mode::parse), fields.next()) {
                (Some(mode), None) => Self::Mode(mode),
                _ => Self::Invalid,
            }
        } else if keyword.eq_ignore_ascii_case("SET") {
            match (fields.next(), fields.next(), fields.next()) {
                (Some(device), Some(value), None) => {
                    // Only the exact token "1" means on; anything else,
                    // empty included, means off.
                    Self::SetActuator(Device::parse(device), value == "1")
                }
                _ => Self::Invalid,
            }
        } else if keyword.eq_ignore_ascii_case("SETPT") {
            match (fields.next(), fields.next(), fields.next()) {
                (Some(field), Some(value), None) => Self::SetPoint(
                    SetpointField::parse(field),
                    // Unparsable setpoint values fall back to zero, taken
                    // as-is with no validation.
                    value.trim().parse::<f32>().unwrap_or(0.0),
                ),
                _ => Self::Invalid,
            }
        } else {
            Self::Invalid
        }
    }
}

/// Applies one decoded command to the engine. Recognized commands reply
/// with a status line (the sole acknowledgement mechanism); `Invalid` is
/// silently dropped.
pub fn execute(engine: &mut ControlEngine, command: Command) -> Option<String> {
    match command {
        Command::Get => {}
        Command::Mode(mode) => engine.set_mode(mode),
        Command::SetActuator(device, on) => engine.set_actuator(device, on),
        Command::SetPoint(field, value) => engine.set_threshold(field, value),
        Command::Invalid => return None,
    }
    Some(status_line(engine))
}

/// Parses and applies one raw line.
pub fn handle_line(engine: &mut ControlEngine, line: &str) -> Option<String> {
    execute(engine, Command::parse(line))
}

/// Renders the fixed-order status record (without the trailing newline;
/// the transport appends its terminator).
pub fn status_line(engine: &ControlEngine) -> String {
    let reading = engine.latest_reading();
    let thresholds = engine.thresholds();
    format!(
        "STATUS,temp={},hum={},heater={},fan={},mode={},temp_on={:.2},temp_off={:.2},hum_on={:.2},hum_off={:.2}",
        fmt_measurement(reading.temperature_c, reading.temperature_valid),
        fmt_measurement(reading.humidity_pct, reading.humidity_valid),
        u8::from(engine.heater_on()),
        u8::from(engine.fan_on()),
        engine.mode().as_str(),
        thresholds.temp_on_c,
        thresholds.temp_off_c,
        thresholds.hum_on_pct,
        thresholds.hum_off_pct,
    )
}

fn fmt_measurement(value: f32, valid: bool) -> String {
    if valid {
        format!("{value:.2}")
    } else {
        "nan".to_string()
    }
}

/// Accumulates a raw character stream into dispatchable lines.
///
/// `\n` and `\r` both terminate; empty lines (including the second half of
/// a CRLF pair) are swallowed. Accumulation stops at [`MAX_LINE_LEN`].
#[derive(Debug, Default)]
pub struct LineAssembler {
    buf: String,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one character; returns a complete line when a terminator
    /// closes a non-empty buffer.
    pub fn push(&mut self, ch: char) -> Option<String> {
        if ch == '\n' || ch == '\r' {
            if self.buf.is_empty() {
                None
            } else {
                Some(mem::take(&mut self.buf))
            }
        } else {
            if self.buf.len() < MAX_LINE_LEN {
                self.buf.push(ch);
            }
            None
        }
    }

    /// Feeds a chunk of raw bytes, returning every line completed by it.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        bytes
            .iter()
            .filter_map(|&byte| self.push(byte as char))
            .collect()
    }
}
