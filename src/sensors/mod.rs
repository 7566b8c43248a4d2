//! Polled sensors: GPS position for segment annotation and the low-battery pin.

mod battery;
mod gps;
mod mock;

pub use battery::{BatteryPoller, DigitalInput, FixedLevel, SysfsGpioInput};
pub use gps::{GpsFix, GpsPoller, GpsReading, GpsReport, GpsdSession, LocationSource};
pub use mock::{MockDigitalInput, MockInputState, ScriptedLocationSource};
