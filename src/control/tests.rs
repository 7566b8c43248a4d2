use super::*;
use crate::buttons::{ButtonAction, ButtonRegistry, ButtonSpec, Rect};
use crate::camera::{CameraDevice, CropRect, MockCameraBackend, MockCameraState};
use crate::config::DashcamConfig;
use crate::display::{Color, Icon, IconSet, MemorySurface, MemorySurfaceState};
use crate::recording::{MockRecorderState, MockSegmentRecorder};
use crate::sensors::{BatteryPoller, MockDigitalInput, MockInputState};
use crate::system::MockPower;
use crate::touch::{ScriptedTouchSource, TouchEvent, TouchScript};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime};
use tokio_util::sync::CancellationToken;

struct Harness {
    control: ControlLoop,
    camera: Arc<Mutex<MockCameraState>>,
    surface: Arc<Mutex<MemorySurfaceState>>,
    touches: Arc<Mutex<TouchScript>>,
    battery: Arc<Mutex<MockInputState>>,
    recorder: Arc<Mutex<MockRecorderState>>,
    power: Arc<Mutex<Vec<ShutdownReason>>>,
}

fn registry() -> ButtonRegistry {
    let mut registry = ButtonRegistry::from_configs(&DashcamConfig::default().buttons).unwrap();
    registry.register(
        ButtonSpec::new(
            Rect::new(100, 100, 20, 20),
            None,
            Some(ButtonAction::NoOp),
            Some("hello".to_string()),
        )
        .unwrap(),
    );
    registry
}

fn harness() -> Harness {
    harness_with_power(MockPower::new())
}

fn harness_with_power(power: MockPower) -> Harness {
    let backend = MockCameraBackend::new();
    let camera = backend.state();
    let surface = MemorySurface::new(320, 240);
    let surface_state = surface.state();
    let touch = ScriptedTouchSource::new();
    let touches = touch.script();
    let input = MockDigitalInput::new(true);
    let battery = input.state();
    let recorder = MockSegmentRecorder::new();
    let recorder_state = recorder.state();
    recorder_state.lock().delay = Duration::from_millis(30);
    let requests = power.requests();

    let icons = IconSet::from_icons(vec![Icon::new("go", 10, 10, vec![255; 10 * 10 * 4])]);

    let control = ControlLoop::builder()
        .camera(
            CameraDevice::new(Box::new(backend)),
            (320, 240),
            CropRect::FULL,
        )
        .surface(Box::new(surface))
        .touch(Box::new(touch))
        .buttons(registry())
        .icons(icons)
        .battery(BatteryPoller::new(Box::new(input), true))
        .recorder(Arc::new(recorder))
        .power(Box::new(power))
        .idle_tick(Duration::from_millis(1))
        .build()
        .unwrap();

    Harness {
        control,
        camera,
        surface: surface_state,
        touches,
        battery,
        recorder: recorder_state,
        power: requests,
    }
}

impl Harness {
    fn tick(&mut self) -> TickOutcome {
        self.control.tick().unwrap()
    }

    fn tick_until_previewing(&mut self) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while self.control.state() != DeviceState::Previewing {
            assert!(Instant::now() < deadline, "worker never stopped");
            assert_eq!(self.tick(), TickOutcome::Continue);
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn start_recording(&mut self) {
        self.tick();
        self.touches.lock().tap(25, 25);
        self.tick();
        assert_eq!(self.control.state(), DeviceState::Recording);
    }
}

#[test]
fn test_first_tick_acquires_camera_and_renders_preview() {
    let mut h = harness();
    assert!(!h.control.camera().is_live());

    assert_eq!(h.tick(), TickOutcome::Continue);

    assert_eq!(h.control.state(), DeviceState::Previewing);
    assert!(h.control.camera().is_live());
    assert_eq!(h.camera.lock().captures, 1);

    let surface = h.surface.lock();
    assert_eq!(surface.presents, 1);
    assert_eq!(surface.frame_blits, 1);
    // Only the "go" icon exists; the shutdown button is drawn without one
    assert_eq!(surface.icon_blits, vec!["go".to_string()]);
    assert_eq!(h.control.stats().frames_rendered, 1);
}

#[test]
fn test_start_button_begins_recording() {
    let mut h = harness();
    h.start_recording();

    assert!(!h.control.camera().is_live());
    assert!(!h.camera.lock().is_open);
    assert!(h.control.is_worker_active());
    assert_eq!(h.surface.lock().fills.last(), Some(&Color::BLACK));

    let deadline = Instant::now() + Duration::from_secs(5);
    while h.recorder.lock().segments.is_empty() {
        assert!(Instant::now() < deadline);
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(
        h.recorder.lock().segments[0].path,
        PathBuf::from("/media/usb/dash0.h264")
    );
    assert_eq!(h.recorder.lock().segments[0].gps_tag, "No GPS");
}

#[test]
fn test_touch_while_recording_only_sets_interrupt() {
    let mut h = harness();
    h.start_recording();
    let captures = h.camera.lock().captures;

    // Lands on the shutdown button, but recording touches are never dispatched
    h.touches.lock().tap(295, 25);
    assert_eq!(h.tick(), TickOutcome::Continue);

    assert!(h.control.signals().stop_requested());
    assert!(h.power.lock().is_empty());
    assert_ne!(h.control.state(), DeviceState::ShuttingDown);
    assert_eq!(h.camera.lock().captures, captures);

    h.tick_until_previewing();

    assert!(h.control.camera().is_live());
    assert_eq!(h.control.camera().leases_granted(), 2);
    assert!(!h.control.signals().stop_requested());
    assert!(!h.control.signals().is_stopped());
    assert!(h.control.last_summary().is_some());
}

#[test]
fn test_start_then_immediate_stop_records_one_segment() {
    let mut h = harness();
    h.tick();

    // The second press arrives after the state changed and acts as an interrupt
    h.touches.lock().push_batch(vec![
        TouchEvent::press_at(25, 25, SystemTime::now()),
        TouchEvent::press_at(100, 100, SystemTime::now()),
    ]);
    h.tick();
    assert_eq!(h.control.state(), DeviceState::Recording);
    assert!(h.control.signals().stop_requested());

    h.tick_until_previewing();

    assert_eq!(h.recorder.lock().segments.len(), 1);
    assert_eq!(h.control.last_summary().unwrap().segments_completed, 1);
}

#[test]
fn test_camera_stays_released_while_recording() {
    let mut h = harness();
    h.start_recording();

    for _ in 0..5 {
        h.tick();
        assert!(!h.camera.lock().is_open);
        assert!(h.surface.lock().last_presented.is_some());
    }

    // One blank frame from the tick that started recording
    assert_eq!(h.control.stats().blank_frames, 6);
    assert_eq!(
        h.surface.lock().last_presented.as_ref().unwrap().pixel(160, 120),
        Some(Color::BLACK)
    );

    h.touches.lock().tap(160, 120);
    h.tick_until_previewing();
    assert_eq!(h.camera.lock().opens, 2);
}

#[test]
fn test_low_battery_while_previewing_shuts_down() {
    let mut h = harness();
    h.tick();

    h.battery.lock().level = false;
    assert_eq!(h.tick(), TickOutcome::Halted);

    assert_eq!(h.control.state(), DeviceState::ShuttingDown);
    assert!(!h.camera.lock().is_open);
    assert_eq!(*h.power.lock(), vec![ShutdownReason::LowBattery]);

    let presents = {
        let surface = h.surface.lock();
        assert_eq!(surface.fills.last(), Some(&Color::RED));
        assert_eq!(
            surface.last_presented.as_ref().unwrap().pixel(0, 0),
            Some(Color::RED)
        );
        surface.presents
    };

    // Terminal: no further rendering or polling
    let polls = h.touches.lock().polls;
    assert_eq!(h.tick(), TickOutcome::Halted);
    assert_eq!(h.surface.lock().presents, presents);
    assert_eq!(h.touches.lock().polls, polls);
    assert_eq!(h.power.lock().len(), 1);
}

#[test]
fn test_low_battery_while_recording_interrupts_worker() {
    let mut h = harness();
    h.start_recording();

    h.battery.lock().level = false;
    assert_eq!(h.tick(), TickOutcome::Halted);

    assert!(h.control.signals().stop_requested());
    assert_eq!(h.control.state(), DeviceState::ShuttingDown);
    assert_eq!(*h.power.lock(), vec![ShutdownReason::LowBattery]);
    assert!(!h.camera.lock().is_open);
}

#[test]
fn test_battery_read_failure_is_treated_as_low() {
    let mut h = harness();
    h.tick();

    h.battery.lock().fail_reads = true;
    assert_eq!(h.tick(), TickOutcome::Halted);
    assert_eq!(h.control.shutdown_reason(), Some(&ShutdownReason::LowBattery));
}

#[test]
fn test_shutdown_button() {
    let mut h = harness();
    h.tick();

    h.touches.lock().tap(295, 25);
    assert_eq!(h.tick(), TickOutcome::Halted);

    assert_eq!(*h.power.lock(), vec![ShutdownReason::UserRequest]);
    assert_eq!(h.surface.lock().fills.last(), Some(&Color::RED));
    assert!(!h.camera.lock().is_open);
}

#[test]
fn test_noop_button_and_misses_keep_previewing() {
    let mut h = harness();
    h.tick();

    h.touches.lock().tap(110, 110);
    h.touches.lock().tap(200, 200);
    h.touches.lock().push_batch(vec![TouchEvent::press(SystemTime::now())]);
    h.tick();
    h.tick();
    h.tick();

    assert_eq!(h.control.state(), DeviceState::Previewing);
    assert!(h.control.camera().is_live());
    assert!(h.power.lock().is_empty());
}

#[test]
fn test_capture_failure_drops_frame_only() {
    let mut h = harness();
    h.tick();

    h.camera.lock().fail_captures = true;
    assert_eq!(h.tick(), TickOutcome::Continue);

    assert_eq!(h.control.stats().render_errors, 1);
    assert_eq!(h.control.state(), DeviceState::Previewing);
}

#[test]
fn test_run_until_low_battery() {
    let mut h = harness();
    h.battery.lock().level = false;

    let reason = h.control.run(&CancellationToken::new()).unwrap();

    assert_eq!(reason, ShutdownReason::LowBattery);
    assert!(reason.powers_off());
}

#[test]
fn test_run_cancelled_while_recording_joins_worker() {
    let mut h = harness();
    h.start_recording();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let reason = h.control.run(&cancel).unwrap();

    assert!(!reason.powers_off());
    assert!(!h.control.is_worker_active());
    assert_eq!(h.control.state(), DeviceState::ShuttingDown);
    assert!(!h.camera.lock().is_open);
    assert!(h.power.lock().is_empty());
    assert!(!h.recorder.lock().segments.is_empty());
}

#[test]
fn test_failed_power_off_while_recording_does_not_wait_for_segment() {
    let mut h = harness_with_power(MockPower::failing());
    h.recorder.lock().delay = Duration::from_millis(800);
    h.start_recording();

    h.battery.lock().level = false;
    let started = Instant::now();
    let result = h.control.run(&CancellationToken::new());

    assert!(result.is_err());
    assert!(started.elapsed() < Duration::from_millis(400));
    assert!(h.control.is_worker_active());
    assert!(h.control.signals().stop_requested());
    assert_eq!(h.control.shutdown_reason(), Some(&ShutdownReason::LowBattery));
    assert_eq!(h.control.state(), DeviceState::ShuttingDown);
    assert!(!h.camera.lock().is_open);
    assert_eq!(*h.power.lock(), vec![ShutdownReason::LowBattery]);
}

#[test]
fn test_idle_sleep_unless_capture_paces_the_loop() {
    let mut h = harness();
    h.tick();
    assert!(h.control.needs_idle_sleep());

    h.camera.lock().paces_capture = true;
    assert!(!h.control.needs_idle_sleep());

    h.start_recording();
    assert!(h.control.needs_idle_sleep());

    h.touches.lock().tap(160, 120);
    h.tick_until_previewing();
}

#[test]
fn test_builder_requires_devices() {
    assert!(ControlLoop::builder().build().is_err());

    let result = ControlLoop::builder()
        .camera(
            CameraDevice::new(Box::new(MockCameraBackend::new())),
            (320, 240),
            CropRect::FULL,
        )
        .build();
    assert!(result.is_err());
}

#[test]
fn test_state_display() {
    assert_eq!(DeviceState::Previewing.to_string(), "previewing");
    assert_eq!(DeviceState::ShuttingDown.to_string(), "shutting down");
}
