use super::*;
use crate::config::{CameraBackendKind, CameraConfig};
use crate::error::{CameraError, DashcamError};
use crate::frame::FrameFormat;

fn create_test_camera_config() -> CameraConfig {
    CameraConfig {
        backend: CameraBackendKind::TestPattern,
        source: "libcamerasrc".to_string(),
        resolution: (320, 240),
        crop: (0.0, 0.0, 1.0, 1.0),
        capture_timeout_ms: 1000,
    }
}

fn mock_device() -> (CameraDevice, std::sync::Arc<parking_lot::Mutex<MockCameraState>>) {
    let backend = MockCameraBackend::new();
    let state = backend.state();
    (CameraDevice::new(Box::new(backend)), state)
}

#[test]
fn test_acquire_and_capture() {
    let (mut camera, state) = mock_device();
    assert_eq!(camera.state(), LeaseState::Unacquired);

    camera.acquire((320, 240), CropRect::FULL).unwrap();
    assert_eq!(camera.state(), LeaseState::Live);
    assert!(state.lock().is_open);
    assert_eq!(state.lock().last_resolution, Some((320, 240)));

    let frame = camera.capture_frame().unwrap();
    assert_eq!(frame.format, FrameFormat::I420);
    assert_eq!(frame.width, 320);
    assert_eq!(frame.height, 240);
    assert!(frame.validate_size());
    assert_eq!(frame.id, 1);

    let frame = camera.capture_frame().unwrap();
    assert_eq!(frame.id, 2);
}

#[test]
fn test_acquire_twice_is_busy() {
    let (mut camera, state) = mock_device();
    camera.acquire((320, 240), CropRect::FULL).unwrap();

    let result = camera.acquire((320, 240), CropRect::FULL);
    assert!(matches!(result, Err(CameraError::DeviceBusy)));
    assert_eq!(state.lock().opens, 1);
    assert!(camera.is_live());
}

#[test]
fn test_capture_without_lease() {
    let (mut camera, state) = mock_device();

    let result = camera.capture_frame();
    assert!(matches!(result, Err(CameraError::NotAcquired)));
    assert_eq!(state.lock().captures, 0);
}

#[test]
fn test_release_is_idempotent() {
    let (mut camera, state) = mock_device();

    camera.release();
    assert_eq!(state.lock().closes, 0);

    camera.acquire((320, 240), CropRect::FULL).unwrap();
    camera.release();
    camera.release();

    assert_eq!(camera.state(), LeaseState::Unacquired);
    assert_eq!(state.lock().closes, 1);
    assert!(!state.lock().is_open);
}

#[test]
fn test_reacquire_after_release() {
    let (mut camera, state) = mock_device();

    for _ in 0..3 {
        camera.acquire((320, 240), CropRect::FULL).unwrap();
        camera.capture_frame().unwrap();
        camera.release();
    }

    let state = state.lock();
    assert_eq!(state.opens, 3);
    assert_eq!(state.closes, 3);
    assert_eq!(camera.leases_granted(), 3);
}

#[test]
fn test_failed_open_leaves_unacquired() {
    let (mut camera, state) = mock_device();
    state.lock().fail_next_open = true;

    let result = camera.acquire((320, 240), CropRect::FULL);
    assert!(matches!(result, Err(CameraError::Open { .. })));
    assert_eq!(camera.state(), LeaseState::Unacquired);

    camera.acquire((320, 240), CropRect::FULL).unwrap();
    assert!(camera.is_live());
}

#[test]
fn test_drop_releases_peripheral() {
    let (mut camera, state) = mock_device();
    camera.acquire((320, 240), CropRect::FULL).unwrap();

    drop(camera);

    assert!(!state.lock().is_open);
    assert_eq!(state.lock().closes, 1);
}

#[test]
fn test_drop_releases_on_panic() {
    let (mut camera, state) = mock_device();
    camera.acquire((320, 240), CropRect::FULL).unwrap();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
        let _camera = camera;
        panic!("render failure");
    }));

    assert!(result.is_err());
    assert!(!state.lock().is_open);
}

#[test]
fn test_crop_edges_in_pixels() {
    assert_eq!(CropRect::FULL.edges_in_pixels(320, 240), (0, 0, 0, 0));

    let crop = CropRect::new(0.25, 0.25, 0.5, 0.5);
    assert_eq!(crop.edges_in_pixels(320, 240), (80, 80, 60, 60));
}

#[test]
fn test_pipeline_description() {
    let desc = pipeline_description("libcamerasrc", (320, 240), CropRect::FULL);
    assert!(desc.starts_with("libcamerasrc ! "));
    assert!(desc.contains("format=I420,width=320,height=240"));
    assert!(!desc.contains("videocrop"));
    assert!(desc.contains("appsink name=sink"));

    let desc = pipeline_description("v4l2src", (320, 240), CropRect::new(0.0, 0.0, 0.5, 1.0));
    assert!(desc.contains("videocrop left=0 right=160 top=0 bottom=0"));
}

#[test]
fn test_builder_validation() {
    let result = CameraDeviceBuilder::new().build();

    if let Err(DashcamError::System { message }) = result {
        assert!(message.contains("Camera configuration must be specified"));
    } else {
        panic!("Expected system error for missing configuration");
    }
}

#[test]
fn test_builder_test_pattern_backend() {
    let mut camera = CameraDeviceBuilder::new()
        .config(create_test_camera_config())
        .build()
        .unwrap();

    camera.acquire((320, 240), CropRect::FULL).unwrap();
    let first = camera.capture_frame().unwrap();
    let second = camera.capture_frame().unwrap();

    assert!(first.validate_size());
    assert_ne!(first.data[0], second.data[0]);
    assert!(!camera.paces_capture());
}
