//! ESP32 target: DHT22 on a single data pin, two relay GPIOs, and a UART
//! command link to the host bridge.

use std::{thread, time::Duration};

use anyhow::Context;
use dht_sensor::dht22;
use esp_idf_hal::{
    delay::{Ets, NON_BLOCK},
    gpio::{AnyIOPin, AnyOutputPin, IOPin, InputOutput, Level, Output, OutputPin, PinDriver, Pull},
    uart::{config::Config as UartConfig, UartDriver},
    units::Hertz,
};
use esp_idf_svc::{hal::prelude::Peripherals, log::EspLogger};
use log::{info, warn};

use climateone_common::{
    handle_line, read_with_retries, ControlEngine, DisplaySink, LineAssembler, OutputSink,
    Reading, RuntimeConfig, SensorSource,
};

const DHT22_PIN: i32 = 4;
const UART_BAUD: u32 = 115_200;

struct Dht22Sensor {
    pin: PinDriver<'static, AnyIOPin, InputOutput>,
    delay: Ets,
}

impl Dht22Sensor {
    fn new(pin: AnyIOPin) -> anyhow::Result<Self> {
        let mut pin = PinDriver::input_output_od(pin)?;
        pin.set_pull(Pull::Up)?;
        pin.set_high()?;
        Ok(Self { pin, delay: Ets })
    }
}

impl SensorSource for Dht22Sensor {
    fn read(&mut self) -> Reading {
        if let Err(err) = self.pin.set_high() {
            warn!("failed to raise DHT22 line before read: {err:?}");
            return Reading::invalid();
        }

        // The DHT protocol delivers both fields in one frame, so a failed
        // read invalidates both; the retry wrapper deals with the rest.
        match dht22::blocking::read(&mut self.delay, &mut self.pin) {
            Ok(sample) => Reading::new(Some(sample.temperature), Some(sample.relative_humidity)),
            Err(err) => {
                warn!("DHT22 read failed on GPIO{DHT22_PIN}: {err:?}");
                Reading::invalid()
            }
        }
    }
}

struct RelayOutputs {
    heater: PinDriver<'static, AnyOutputPin, Output>,
    fan: PinDriver<'static, AnyOutputPin, Output>,
}

impl RelayOutputs {
    fn new(heater_pin: AnyOutputPin, fan_pin: AnyOutputPin) -> anyhow::Result<Self> {
        Ok(Self {
            heater: PinDriver::output(heater_pin)?,
            fan: PinDriver::output(fan_pin)?,
        })
    }
}

fn level(on: bool) -> Level {
    if on {
        Level::High
    } else {
        Level::Low
    }
}

impl OutputSink for RelayOutputs {
    fn apply(&mut self, heater_on: bool, fan_on: bool) {
        if let Err(err) = self.heater.set_level(level(heater_on)) {
            warn!("heater relay write failed: {err:?}");
        }
        if let Err(err) = self.fan.set_level(level(fan_on)) {
            warn!("fan relay write failed: {err:?}");
        }
    }
}

/// Stand-in display: renders to the log. The loop runs the same with no
/// screen attached at all.
struct LogDisplay;

impl DisplaySink for LogDisplay {
    fn render(&mut self, reading: &Reading, heater_on: bool, fan_on: bool) {
        info!(
            "temp={} hum={} heater={} fan={}",
            if reading.temperature_valid {
                format!("{:.1}C", reading.temperature_c)
            } else {
                "--".to_string()
            },
            if reading.humidity_valid {
                format!("{:.1}%", reading.humidity_pct)
            } else {
                "--".to_string()
            },
            heater_on as u8,
            fan_on as u8,
        );
    }
}

pub fn run() -> anyhow::Result<()> {
    esp_idf_svc::sys::link_patches();
    EspLogger::initialize_default();

    // No filesystem on this board profile; startup defaults only. Setpoint
    // changes over the link last until reset.
    let config = RuntimeConfig::default();

    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    let mut sensor =
        Dht22Sensor::new(pins.gpio4.downgrade()).context("failed to initialize DHT22")?;
    let mut outputs = RelayOutputs::new(pins.gpio26.downgrade_output(), pins.gpio27.downgrade_output())
        .context("failed to initialize relay outputs")?;
    let mut display = LogDisplay;

    let uart = UartDriver::new(
        peripherals.uart1,
        pins.gpio17,
        pins.gpio16,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(UART_BAUD)),
    )
    .context("failed to initialize command UART")?;

    let mut engine = ControlEngine::new(config.thresholds);
    let mut assembler = LineAssembler::new();
    let retry_delay = Duration::from_millis(config.controller.sensor_retry_delay_ms);

    info!("climateone controller up, cycle {}ms", config.controller.cycle_interval_ms);

    loop {
        let reading = read_with_retries(
            &mut sensor,
            config.controller.sensor_retry_attempts,
            retry_delay,
        );

        engine.update(reading);
        outputs.apply(engine.heater_on(), engine.fan_on());
        display.render(engine.latest_reading(), engine.heater_on(), engine.fan_on());

        // Drain whatever arrived on the link since the last cycle.
        let mut buf = [0_u8; 64];
        loop {
            match uart.read(&mut buf, NON_BLOCK) {
                Ok(0) => break,
                Ok(n) => {
                    for line in assembler.feed(&buf[..n]) {
                        if let Some(reply) = handle_line(&mut engine, &line) {
                            if let Err(err) = uart.write(reply.as_bytes()) {
                                warn!("status write failed: {err:?}");
                            } else if let Err(err) = uart.write(b"\n") {
                                warn!("status terminator write failed: {err:?}");
                            }
                        }
                    }
                }
                Err(_) => break,
            }
        }

        thread::sleep(Duration::from_millis(config.controller.cycle_interval_ms));
    }
}
