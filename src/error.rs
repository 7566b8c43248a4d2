use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashcamError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Sensor error: {0}")]
    Sensor(#[from] SensorError),

    #[error("Recording error: {0}")]
    Recording(#[from] RecordingError),

    #[error("Display error: {0}")]
    Display(#[from] DisplayError),

    #[error("Touch error: {0}")]
    Touch(#[from] TouchError),

    #[error("System error: {message}")]
    System { message: String },

    #[error("Component error in {component}: {message}")]
    Component { component: String, message: String },
}

/// Camera peripheral lifecycle and capture failures
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Camera is already acquired")]
    DeviceBusy,

    #[error("Camera capture attempted without an active lease")]
    NotAcquired,

    #[error("Failed to open camera: {details}")]
    Open { details: String },

    #[error("Failed to capture frame: {details}")]
    Capture { details: String },

    #[error("Camera configuration error: {details}")]
    Configuration { details: String },
}

#[derive(Error, Debug)]
pub enum SensorError {
    #[error("{sensor} unavailable: {details}")]
    Unavailable { sensor: String, details: String },
}

#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("Segment capture failed for {path}: {details}")]
    SegmentCapture { path: String, details: String },

    #[error("Failed to spawn recording worker: {details}")]
    Spawn { details: String },

    #[error("Recording worker panicked")]
    WorkerPanicked,
}

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Framebuffer error: {details}")]
    Framebuffer { details: String },

    #[error("Format conversion error: {details}")]
    FormatConversion { details: String },

    #[error("Failed to load icon {path}: {details}")]
    Icon { path: String, details: String },
}

#[derive(Error, Debug)]
pub enum TouchError {
    #[error("Failed to open touch device {device}: {details}")]
    DeviceOpen { device: String, details: String },

    #[error("Touch device read error: {details}")]
    DeviceRead { details: String },

    #[error("Touch input not available on this system")]
    NotAvailable,
}

impl DashcamError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn component<S: Into<String>>(component: S, message: S) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Lease errors only surface when the state machine itself is broken
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            DashcamError::Camera(CameraError::DeviceBusy)
                | DashcamError::Camera(CameraError::NotAcquired)
        )
    }
}

impl SensorError {
    pub fn unavailable<S: Into<String>, D: ToString>(sensor: S, details: D) -> Self {
        Self::Unavailable {
            sensor: sensor.into(),
            details: details.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashcamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_violations() {
        assert!(DashcamError::from(CameraError::DeviceBusy).is_contract_violation());
        assert!(DashcamError::from(CameraError::NotAcquired).is_contract_violation());
        assert!(!DashcamError::from(CameraError::Open {
            details: "no device".to_string()
        })
        .is_contract_violation());
        assert!(!DashcamError::system("boom").is_contract_violation());
    }

    #[test]
    fn test_error_messages() {
        let err = DashcamError::from(RecordingError::SegmentCapture {
            path: "/media/usb/dash3.h264".to_string(),
            details: "exit status 1".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Recording error: Segment capture failed for /media/usb/dash3.h264: exit status 1"
        );

        let err = SensorError::unavailable("gps", "timed out");
        assert_eq!(err.to_string(), "gps unavailable: timed out");
    }
}
