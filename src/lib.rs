pub mod buttons;
pub mod camera;
pub mod config;
pub mod control;
pub mod display;
pub mod error;
pub mod frame;
pub mod recording;
pub mod sensors;
pub mod system;
pub mod touch;

pub use buttons::{ButtonAction, ButtonRegistry, ButtonSpec, Point, Rect};
pub use camera::{CameraDevice, CameraDeviceBuilder, CropRect, LeaseState};
pub use config::DashcamConfig;
pub use control::{ControlLoop, ControlLoopBuilder, DeviceState, ShutdownReason, TickOutcome};
pub use display::{DisplayConverter, DisplayStats, DisplaySurface, IconSet};
pub use error::{DashcamError, Result};
pub use frame::{FrameData, FrameFormat, RawFrame, RgbFrame};
pub use recording::{RecordingSummary, RecordingWorker, SegmentRecorder};
pub use sensors::{BatteryPoller, GpsPoller, GpsReading};
pub use touch::{TouchEvent, TouchEventType, TouchSource};
