use crate::error::CameraError;
use serde::{Deserialize, Serialize};

/// Output resolution (width, height)
pub type Resolution = (u32, u32);

/// Normalised sensor crop rectangle, all values in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub const FULL: CropRect = CropRect {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }

    /// Pixels trimmed from each edge (left, right, top, bottom) of a frame
    pub fn edges_in_pixels(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let w = width as f64;
        let h = height as f64;
        let left = (self.x * w).round() as u32;
        let top = (self.y * h).round() as u32;
        let right = ((1.0 - self.x - self.width) * w).round().max(0.0) as u32;
        let bottom = ((1.0 - self.y - self.height) * h).round().max(0.0) as u32;
        (left, right, top, bottom)
    }
}

impl From<(f64, f64, f64, f64)> for CropRect {
    fn from((x, y, width, height): (f64, f64, f64, f64)) -> Self {
        Self::new(x, y, width, height)
    }
}

/// Raw camera capture API.
///
/// A backend must tolerate any number of open/close cycles without leaking
/// OS resources. `capture` returns a tightly packed I420 buffer of
/// `width * height * 3 / 2` bytes at the resolution passed to `open`.
pub trait CameraBackend: Send {
    fn open(&mut self, resolution: Resolution, crop: CropRect) -> Result<(), CameraError>;

    fn capture(&mut self) -> Result<Vec<u8>, CameraError>;

    /// Close the peripheral. Never fails; problems are logged by the backend.
    fn close(&mut self);

    /// Whether `capture` waits for the sensor's next frame
    fn paces_capture(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str;
}
