//! Host harness: runs the control loop against a simulated sensor, with
//! stdin/stdout standing in for the serial command link. Useful for
//! exercising the protocol end to end without hardware:
//!
//! ```text
//! $ echo "GET" | cargo run -p climateone-controller
//! ```

use std::time::Duration;

use tokio::{io::AsyncReadExt, sync::mpsc};
use tracing::{info, warn};

use climateone_common::{
    handle_line, read_with_retries, ControlEngine, DisplaySink, LineAssembler, OutputSink,
    Reading, RuntimeConfig, SensorSource,
};

/// Deterministic drifting sensor. Temperature sweeps through the default
/// hysteresis band and back; humidity does the same against its own band.
/// Every so often a field "fails" so the nan/hold paths get exercised.
struct SimulatedSensor {
    tick: u64,
}

impl SensorSource for SimulatedSensor {
    fn read(&mut self) -> Reading {
        self.tick = self.tick.wrapping_add(1);

        let phase = (self.tick % 40) as f32;
        let temperature = 17.0 + phase * 0.4;
        let humidity = 45.0 + ((self.tick % 30) as f32);

        let temperature = (self.tick % 13 != 0).then_some(temperature);
        let humidity = (self.tick % 17 != 0).then_some(humidity);
        Reading::new(temperature, humidity)
    }
}

/// Logs actuator transitions in place of driving relays.
#[derive(Default)]
struct LoggingOutputs {
    last: Option<(bool, bool)>,
}

impl OutputSink for LoggingOutputs {
    fn apply(&mut self, heater_on: bool, fan_on: bool) {
        if self.last != Some((heater_on, fan_on)) {
            info!("outputs: heater={} fan={}", heater_on as u8, fan_on as u8);
            self.last = Some((heater_on, fan_on));
        }
    }
}

struct LogDisplay;

impl DisplaySink for LogDisplay {
    fn render(&mut self, reading: &Reading, heater_on: bool, fan_on: bool) {
        let temp = if reading.temperature_valid {
            format!("{:.1}C", reading.temperature_c)
        } else {
            "--.-C".to_string()
        };
        let hum = if reading.humidity_valid {
            format!("{:.1}%", reading.humidity_pct)
        } else {
            "--.-%".to_string()
        };
        info!(
            "display: {temp} {hum} H:{} F:{}",
            heater_on as u8, fan_on as u8
        );
    }
}

/// Reads raw bytes from stdin and forwards fully assembled command lines.
fn spawn_stdin_reader(lines: mpsc::UnboundedSender<String>) {
    tokio::spawn(async move {
        let mut stdin = tokio::io::stdin();
        let mut assembler = LineAssembler::new();
        let mut buf = [0_u8; 256];

        loop {
            match stdin.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    for line in assembler.feed(&buf[..n]) {
                        if lines.send(line).is_err() {
                            return;
                        }
                    }
                }
                Err(err) => {
                    warn!("stdin read error: {err}");
                    break;
                }
            }
        }
    });
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match std::env::var("CLIMATEONE_CONFIG") {
        Ok(path) => RuntimeConfig::load(&path).unwrap_or_else(|err| {
            warn!("failed to load config from {path}: {err:#}");
            RuntimeConfig::default()
        }),
        Err(_) => RuntimeConfig::default(),
    };

    let mut engine = ControlEngine::new(config.thresholds);
    let mut sensor = SimulatedSensor { tick: 0 };
    let mut outputs = LoggingOutputs::default();
    let mut display = LogDisplay;

    let (line_tx, mut line_rx) = mpsc::unbounded_channel();
    spawn_stdin_reader(line_tx);

    info!(
        "controller started: cycle {}ms, thresholds {:?}",
        config.controller.cycle_interval_ms, config.thresholds
    );

    let mut interval =
        tokio::time::interval(Duration::from_millis(config.controller.cycle_interval_ms));
    let retry_delay = Duration::from_millis(config.controller.sensor_retry_delay_ms);

    loop {
        interval.tick().await;

        // One cycle, in order: read, decide, actuate, render, then drain
        // whatever command lines arrived since the last cycle.
        let reading = read_with_retries(
            &mut sensor,
            config.controller.sensor_retry_attempts,
            retry_delay,
        );
        if !reading.is_fully_valid() {
            warn!(
                "sensor read incomplete: temp_valid={} hum_valid={}",
                reading.temperature_valid, reading.humidity_valid
            );
        }

        engine.update(reading);
        outputs.apply(engine.heater_on(), engine.fan_on());
        display.render(engine.latest_reading(), engine.heater_on(), engine.fan_on());

        while let Ok(line) = line_rx.try_recv() {
            if let Some(reply) = handle_line(&mut engine, &line) {
                println!("{reply}");
            }
        }
    }
}
