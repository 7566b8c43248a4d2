use super::backend::{CameraBackend, CropRect, Resolution};
use crate::error::CameraError;
use tracing::debug;

/// Synthetic camera producing a moving luma gradient.
///
/// Used when running on a machine without camera hardware.
pub struct TestPatternCamera {
    resolution: Option<Resolution>,
    frame: u64,
}

impl TestPatternCamera {
    pub fn new() -> Self {
        Self {
            resolution: None,
            frame: 0,
        }
    }

    /// I420 frame whose luma shifts with `frame`; chroma is neutral grey
    pub fn generate(width: u32, height: u32, frame: u64) -> Vec<u8> {
        let luma_len = (width * height) as usize;
        let mut data = Vec::with_capacity(luma_len * 3 / 2);

        for y in 0..height {
            for x in 0..width {
                data.push(((x + y) as u64 + frame) as u8);
            }
        }
        data.resize(luma_len * 3 / 2, 128);
        data
    }
}

impl Default for TestPatternCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraBackend for TestPatternCamera {
    fn open(&mut self, resolution: Resolution, _crop: CropRect) -> Result<(), CameraError> {
        debug!("Test pattern camera opened at {}x{}", resolution.0, resolution.1);
        self.resolution = Some(resolution);
        Ok(())
    }

    fn capture(&mut self) -> Result<Vec<u8>, CameraError> {
        let (width, height) = self.resolution.ok_or(CameraError::NotAcquired)?;
        self.frame = self.frame.wrapping_add(1);
        Ok(Self::generate(width, height, self.frame))
    }

    fn close(&mut self) {
        self.resolution = None;
    }

    fn name(&self) -> &'static str {
        "test_pattern"
    }
}
