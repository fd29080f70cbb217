pub mod config;
pub mod engine;
pub mod io;
pub mod protocol;
pub mod types;

pub use config::{ConfigError, ControllerConfig, RuntimeConfig, Thresholds};
pub use engine::ControlEngine;
pub use io::{read_with_retries, DisplaySink, NullDisplay, OutputSink, SensorSource};
pub use protocol::{handle_line, status_line, Command, LineAssembler, MAX_LINE_LEN};
pub use types::{Device, Mode, Reading, SetpointField};
