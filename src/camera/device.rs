use super::backend::{CameraBackend, CropRect, Resolution};
use crate::error::CameraError;
use crate::frame::{FrameData, FrameFormat, RawFrame};
use std::time::{Instant, SystemTime};
use tracing::{debug, info, trace};

/// Lease state of the camera peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseState {
    Unacquired,
    Live,
}

#[derive(Debug, Clone, Copy)]
struct ActiveLease {
    resolution: Resolution,
    acquired_at: Instant,
}

/// Exclusive handle on the camera peripheral.
///
/// The peripheral is closed when the handle is released or dropped, so every
/// exit path (early return, error propagation, unwinding) gives it back.
pub struct CameraDevice {
    backend: Box<dyn CameraBackend>,
    lease: Option<ActiveLease>,
    frame_counter: u64,
    leases_granted: u64,
}

impl CameraDevice {
    pub fn new(backend: Box<dyn CameraBackend>) -> Self {
        Self {
            backend,
            lease: None,
            frame_counter: 0,
            leases_granted: 0,
        }
    }

    pub fn state(&self) -> LeaseState {
        if self.lease.is_some() {
            LeaseState::Live
        } else {
            LeaseState::Unacquired
        }
    }

    pub fn is_live(&self) -> bool {
        self.lease.is_some()
    }

    /// Number of leases granted over the lifetime of this handle
    pub fn leases_granted(&self) -> u64 {
        self.leases_granted
    }

    /// Open the peripheral for preview capture
    pub fn acquire(&mut self, resolution: Resolution, crop: CropRect) -> Result<(), CameraError> {
        if self.lease.is_some() {
            return Err(CameraError::DeviceBusy);
        }

        debug!(
            "Opening {} camera at {}x{} (crop {:?})",
            self.backend.name(),
            resolution.0,
            resolution.1,
            crop
        );
        self.backend.open(resolution, crop)?;

        self.lease = Some(ActiveLease {
            resolution,
            acquired_at: Instant::now(),
        });
        self.frame_counter = 0;
        self.leases_granted += 1;

        info!(
            "Camera lease {} acquired ({}x{})",
            self.leases_granted, resolution.0, resolution.1
        );
        Ok(())
    }

    /// Close the peripheral. No-op when not acquired.
    pub fn release(&mut self) {
        if let Some(lease) = self.lease.take() {
            self.backend.close();
            info!(
                "Camera lease {} released after {:?} ({} frames)",
                self.leases_granted,
                lease.acquired_at.elapsed(),
                self.frame_counter
            );
        }
    }

    /// False when nothing in `capture_frame` limits the frame rate
    pub fn paces_capture(&self) -> bool {
        self.backend.paces_capture()
    }

    pub fn capture_frame(&mut self) -> Result<RawFrame, CameraError> {
        let lease = self.lease.ok_or(CameraError::NotAcquired)?;
        let (width, height) = lease.resolution;

        let data = self.backend.capture()?;
        let expected = FrameFormat::I420.buffer_size(width, height);
        if data.len() != expected {
            return Err(CameraError::Capture {
                details: format!(
                    "Invalid I420 frame size: expected {}, got {}",
                    expected,
                    data.len()
                ),
            });
        }

        self.frame_counter += 1;
        trace!("Captured frame {} ({}x{})", self.frame_counter, width, height);

        Ok(FrameData::new(
            self.frame_counter,
            SystemTime::now(),
            data,
            width,
            height,
            FrameFormat::I420,
        ))
    }
}

impl Drop for CameraDevice {
    fn drop(&mut self) {
        self.release();
    }
}
