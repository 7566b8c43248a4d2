use super::backend::CameraBackend;
use super::device::CameraDevice;
use super::pattern::TestPatternCamera;
use crate::config::{CameraBackendKind, CameraConfig};
use crate::error::{DashcamError, Result};
use tracing::info;

/// Builder selecting the camera backend from configuration
pub struct CameraDeviceBuilder {
    config: Option<CameraConfig>,
    backend: Option<Box<dyn CameraBackend>>,
}

impl CameraDeviceBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            backend: None,
        }
    }

    pub fn config(mut self, config: CameraConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use an explicit backend instead of the configured one
    pub fn backend(mut self, backend: Box<dyn CameraBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn build(self) -> Result<CameraDevice> {
        if let Some(backend) = self.backend {
            return Ok(CameraDevice::new(backend));
        }

        let config = self
            .config
            .ok_or_else(|| DashcamError::system("Camera configuration must be specified"))?;

        let backend = create_backend(&config)?;
        info!("Using {} camera backend", backend.name());
        Ok(CameraDevice::new(backend))
    }
}

impl Default for CameraDeviceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(all(target_os = "linux", feature = "camera"))]
fn create_backend(config: &CameraConfig) -> Result<Box<dyn CameraBackend>> {
    use super::pipeline::GstreamerCamera;
    use std::time::Duration;

    match config.backend {
        CameraBackendKind::Gstreamer => Ok(Box::new(GstreamerCamera::new(
            config.source.clone(),
            Duration::from_millis(config.capture_timeout_ms),
        )?)),
        CameraBackendKind::TestPattern => Ok(Box::new(TestPatternCamera::new())),
    }
}

#[cfg(not(all(target_os = "linux", feature = "camera")))]
fn create_backend(config: &CameraConfig) -> Result<Box<dyn CameraBackend>> {
    match config.backend {
        CameraBackendKind::Gstreamer => Err(DashcamError::component(
            "camera",
            "GStreamer capture requires Linux and the `camera` feature",
        )),
        CameraBackendKind::TestPattern => Ok(Box::new(TestPatternCamera::new())),
    }
}
