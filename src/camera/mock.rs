use super::backend::{CameraBackend, CropRect, Resolution};
use super::pattern::TestPatternCamera;
use crate::error::CameraError;
use parking_lot::Mutex;
use std::sync::Arc;

/// Observable state of a [`MockCameraBackend`]
#[derive(Debug, Clone, Default)]
pub struct MockCameraState {
    pub is_open: bool,
    pub opens: u32,
    pub closes: u32,
    pub captures: u32,
    pub last_resolution: Option<Resolution>,
    pub last_crop: Option<CropRect>,
    /// Fail the next `open` call
    pub fail_next_open: bool,
    /// Fail every `capture` call
    pub fail_captures: bool,
    /// Behave like a backend that blocks for each frame
    pub paces_capture: bool,
}

/// Camera backend for testing without hardware
pub struct MockCameraBackend {
    state: Arc<Mutex<MockCameraState>>,
}

impl MockCameraBackend {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockCameraState::default())),
        }
    }

    /// Shared view of the backend state, usable after the backend is boxed
    pub fn state(&self) -> Arc<Mutex<MockCameraState>> {
        Arc::clone(&self.state)
    }
}

impl Default for MockCameraBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraBackend for MockCameraBackend {
    fn open(&mut self, resolution: Resolution, crop: CropRect) -> Result<(), CameraError> {
        let mut state = self.state.lock();
        if state.fail_next_open {
            state.fail_next_open = false;
            return Err(CameraError::Open {
                details: "mock open failure".to_string(),
            });
        }
        if state.is_open {
            return Err(CameraError::Open {
                details: "mock peripheral opened twice".to_string(),
            });
        }
        state.is_open = true;
        state.opens += 1;
        state.last_resolution = Some(resolution);
        state.last_crop = Some(crop);
        Ok(())
    }

    fn capture(&mut self) -> Result<Vec<u8>, CameraError> {
        let mut state = self.state.lock();
        if !state.is_open {
            return Err(CameraError::NotAcquired);
        }
        if state.fail_captures {
            return Err(CameraError::Capture {
                details: "mock capture failure".to_string(),
            });
        }
        state.captures += 1;
        let (width, height) = state.last_resolution.unwrap_or((2, 2));
        Ok(TestPatternCamera::generate(width, height, state.captures as u64))
    }

    fn close(&mut self) {
        let mut state = self.state.lock();
        if state.is_open {
            state.is_open = false;
            state.closes += 1;
        }
    }

    fn paces_capture(&self) -> bool {
        self.state.lock().paces_capture
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
