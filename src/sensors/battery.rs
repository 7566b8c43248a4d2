use crate::error::SensorError;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Single digital input line; `true` is a high level
pub trait DigitalInput: Send {
    fn read_level(&mut self) -> Result<bool, SensorError>;
}

/// GPIO pin read through the sysfs interface
pub struct SysfsGpioInput {
    pin: u32,
    root: PathBuf,
}

impl SysfsGpioInput {
    /// Export `pin` under `root` if needed and configure it as an input
    pub fn open<P: Into<PathBuf>>(root: P, pin: u32) -> Result<Self, SensorError> {
        let root = root.into();
        let input = Self { pin, root };

        if !input.pin_dir().exists() {
            debug!("Exporting GPIO {}", pin);
            fs::write(input.root.join("export"), pin.to_string())
                .map_err(|e| SensorError::unavailable("battery", e))?;
        }

        if let Err(e) = fs::write(input.pin_dir().join("direction"), "in") {
            // Some boards expose the pin read-only with the direction fixed
            warn!("Could not set GPIO {} direction: {}", pin, e);
        }

        info!("Monitoring battery on GPIO {}", pin);
        Ok(input)
    }

    fn pin_dir(&self) -> PathBuf {
        self.root.join(format!("gpio{}", self.pin))
    }
}

impl DigitalInput for SysfsGpioInput {
    fn read_level(&mut self) -> Result<bool, SensorError> {
        let raw = fs::read_to_string(self.pin_dir().join("value"))
            .map_err(|e| SensorError::unavailable("battery", e))?;

        match raw.trim() {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(SensorError::unavailable(
                "battery",
                format!("unexpected GPIO value {:?}", other),
            )),
        }
    }
}

/// Input pinned to one level, used when monitoring is disabled
pub struct FixedLevel(pub bool);

impl DigitalInput for FixedLevel {
    fn read_level(&mut self) -> Result<bool, SensorError> {
        Ok(self.0)
    }
}

/// Low-battery monitor; the signal is active low
pub struct BatteryPoller {
    input: Box<dyn DigitalInput>,
    treat_read_failure_as_low: bool,
}

impl BatteryPoller {
    pub fn new(input: Box<dyn DigitalInput>, treat_read_failure_as_low: bool) -> Self {
        Self {
            input,
            treat_read_failure_as_low,
        }
    }

    /// Poller that never reports a low battery
    pub fn disabled() -> Self {
        Self::new(Box::new(FixedLevel(true)), false)
    }

    pub fn is_low(&mut self) -> bool {
        match self.input.read_level() {
            Ok(level) => !level,
            Err(e) => {
                warn!(
                    "Battery read failed ({}), treating as {}",
                    e,
                    if self.treat_read_failure_as_low {
                        "low"
                    } else {
                        "ok"
                    }
                );
                self.treat_read_failure_as_low
            }
        }
    }
}
