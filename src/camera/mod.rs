mod backend;
mod builder;
mod device;
mod mock;
mod pattern;
mod pipeline;
#[cfg(test)]
mod tests;

pub use backend::{CameraBackend, CropRect, Resolution};
pub use builder::CameraDeviceBuilder;
pub use device::{CameraDevice, LeaseState};
pub use mock::{MockCameraBackend, MockCameraState};
pub use pattern::TestPatternCamera;
pub use pipeline::pipeline_description;

#[cfg(all(target_os = "linux", feature = "camera"))]
pub use pipeline::GstreamerCamera;
