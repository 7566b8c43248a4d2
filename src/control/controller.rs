use super::types::{DeviceState, ShutdownReason, TickOutcome};
use crate::buttons::{ButtonAction, ButtonRegistry};
use crate::camera::{CameraDevice, CropRect, Resolution};
use crate::config::RecordingConfig;
use crate::display::{Color, DisplayStats, DisplaySurface, FrameConverter, I420Converter, IconSet};
use crate::error::{DashcamError, Result};
use crate::recording::{
    RecordingHandle, RecordingSummary, RecordingWorker, SegmentPlan, SegmentRecorder,
    WorkerSignals,
};
use crate::sensors::{BatteryPoller, GpsPoller};
use crate::system::PowerControl;
use crate::touch::{TouchErrorExt, TouchSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Owns every device and drives the preview / record / shutdown state machine.
///
/// One `tick` polls touch input once, polls the battery once and renders
/// once. Nothing in a tick waits on the recording worker.
pub struct ControlLoop {
    pub(super) state: DeviceState,
    pub(super) camera: CameraDevice,
    pub(super) resolution: Resolution,
    pub(super) crop: CropRect,
    pub(super) converter: Box<dyn FrameConverter>,
    pub(super) surface: Box<dyn DisplaySurface>,
    pub(super) touch: Box<dyn TouchSource>,
    pub(super) buttons: ButtonRegistry,
    pub(super) icons: IconSet,
    pub(super) battery: BatteryPoller,
    pub(super) gps: Arc<GpsPoller>,
    pub(super) recorder: Arc<dyn SegmentRecorder>,
    pub(super) segment_plan: SegmentPlan,
    pub(super) segment_duration: Duration,
    pub(super) signals: WorkerSignals,
    pub(super) worker: Option<RecordingHandle>,
    pub(super) power: Box<dyn PowerControl>,
    pub(super) stats: DisplayStats,
    pub(super) idle_tick: Duration,
    pub(super) shutdown_reason: Option<ShutdownReason>,
    pub(super) last_summary: Option<RecordingSummary>,
}

impl ControlLoop {
    pub fn builder() -> ControlLoopBuilder {
        ControlLoopBuilder::new()
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn camera(&self) -> &CameraDevice {
        &self.camera
    }

    /// Interrupt and completion flags handed to the current worker
    pub fn signals(&self) -> &WorkerSignals {
        &self.signals
    }

    pub fn stats(&self) -> &DisplayStats {
        &self.stats
    }

    pub fn shutdown_reason(&self) -> Option<&ShutdownReason> {
        self.shutdown_reason.as_ref()
    }

    pub fn last_summary(&self) -> Option<&RecordingSummary> {
        self.last_summary.as_ref()
    }

    pub fn is_worker_active(&self) -> bool {
        self.worker.is_some()
    }

    pub fn tick(&mut self) -> Result<TickOutcome> {
        if self.state == DeviceState::ShuttingDown {
            return Ok(TickOutcome::Halted);
        }

        // The first tick takes the initial lease
        if self.state == DeviceState::Previewing && !self.camera.is_live() {
            self.camera.acquire(self.resolution, self.crop)?;
        }

        self.handle_touches()?;
        if self.state == DeviceState::ShuttingDown {
            return Ok(TickOutcome::Halted);
        }

        self.reap_worker()?;

        if self.battery.is_low() {
            warn!("Battery low while {}", self.state);
            self.begin_shutdown(ShutdownReason::LowBattery)?;
            return Ok(TickOutcome::Halted);
        }

        self.render_tick()?;
        Ok(TickOutcome::Continue)
    }

    fn handle_touches(&mut self) -> Result<()> {
        let events = match self.touch.poll_events() {
            Ok(events) => events,
            Err(DashcamError::Touch(e)) if e.is_recoverable() => {
                warn!("{}", e.user_message());
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        for event in events.iter().filter(|event| event.is_press()) {
            match self.state {
                DeviceState::Recording => {
                    if !self.signals.stop_requested() {
                        info!("Touch while recording, stopping after the current segment");
                    }
                    self.signals.request_stop();
                }
                DeviceState::Previewing => {
                    let Some(point) = event.position() else {
                        debug!("Ignoring press without coordinates");
                        continue;
                    };

                    let mut pending = None;
                    self.buttons.dispatch(point, |action, param| {
                        pending = Some((action, param.map(str::to_string)));
                    });

                    if let Some((action, param)) = pending {
                        self.apply_action(action, param.as_deref())?;
                    }
                }
                DeviceState::ShuttingDown => break,
            }
        }

        Ok(())
    }

    fn apply_action(&mut self, action: ButtonAction, param: Option<&str>) -> Result<()> {
        match action {
            ButtonAction::StartRecording => self.start_recording(),
            ButtonAction::Shutdown => self.begin_shutdown(ShutdownReason::UserRequest),
            ButtonAction::NoOp => {
                debug!("No-op button pressed (param {:?})", param);
                Ok(())
            }
        }
    }

    fn start_recording(&mut self) -> Result<()> {
        self.camera.release();
        self.surface.fill(Color::BLACK);
        if let Err(e) = self.surface.present() {
            warn!("Failed to clear display: {}", e);
        }
        self.signals.clear();

        let worker = RecordingWorker::new(
            Arc::clone(&self.recorder),
            Arc::clone(&self.gps),
            self.segment_plan.clone(),
            self.segment_duration,
        );

        match worker.spawn(self.signals.clone()) {
            Ok(handle) => {
                self.worker = Some(handle);
                self.transition(DeviceState::Recording);
                Ok(())
            }
            Err(e) => {
                error!("Could not start recording: {}", e);
                self.camera.acquire(self.resolution, self.crop)?;
                Err(e.into())
            }
        }
    }

    /// Return to preview once the worker has signalled that it stopped
    fn reap_worker(&mut self) -> Result<()> {
        if self.state != DeviceState::Recording {
            return Ok(());
        }

        let finished = self.worker.as_ref().map_or(true, |w| w.is_finished());
        if !finished {
            return Ok(());
        }

        if let Some(worker) = self.worker.take() {
            match worker.join() {
                Ok(summary) => self.last_summary = Some(summary),
                Err(e) => error!("{}", e),
            }
        }

        self.signals.clear();
        self.transition(DeviceState::Previewing);
        self.camera.acquire(self.resolution, self.crop)?;
        Ok(())
    }

    /// Red screen, camera off, then hand over to the power controller.
    ///
    /// A running worker is told to stop but not joined; powering off ends it.
    fn begin_shutdown(&mut self, reason: ShutdownReason) -> Result<()> {
        if self.state == DeviceState::Recording {
            self.signals.request_stop();
        }
        self.transition(DeviceState::ShuttingDown);

        self.surface.fill(Color::RED);
        if let Err(e) = self.surface.present() {
            error!("Failed to show shutdown warning: {}", e);
        }
        self.camera.release();

        info!("Shutting down: {:?}", reason);
        self.shutdown_reason = Some(reason.clone());
        self.power.shutdown(&reason)
    }

    /// Leave the loop without powering off: stop and join the worker, then
    /// release the camera.
    pub fn stop(&mut self, reason: ShutdownReason) {
        if let Some(worker) = self.worker.take() {
            info!("Waiting for the current segment to finish");
            worker.request_stop();
            match worker.join() {
                Ok(summary) => self.last_summary = Some(summary),
                Err(e) => error!("{}", e),
            }
        }

        self.camera.release();
        self.transition(DeviceState::ShuttingDown);
        self.shutdown_reason = Some(reason);
    }

    fn transition(&mut self, next: DeviceState) {
        if self.state != next {
            info!("State {} -> {}", self.state, next);
            self.state = next;
        }
    }
}

impl Drop for ControlLoop {
    fn drop(&mut self) {
        if let Some(worker) = &self.worker {
            worker.request_stop();
        }
    }
}

/// Builder for [`ControlLoop`]
pub struct ControlLoopBuilder {
    camera: Option<CameraDevice>,
    resolution: Resolution,
    crop: CropRect,
    converter: Option<Box<dyn FrameConverter>>,
    surface: Option<Box<dyn DisplaySurface>>,
    touch: Option<Box<dyn TouchSource>>,
    buttons: ButtonRegistry,
    icons: IconSet,
    battery: Option<BatteryPoller>,
    gps: Option<Arc<GpsPoller>>,
    recorder: Option<Arc<dyn SegmentRecorder>>,
    recording: RecordingConfig,
    power: Option<Box<dyn PowerControl>>,
    idle_tick: Duration,
}

impl ControlLoopBuilder {
    pub fn new() -> Self {
        let defaults = crate::config::DashcamConfig::default();
        Self {
            camera: None,
            resolution: defaults.camera.resolution,
            crop: CropRect::FULL,
            converter: None,
            surface: None,
            touch: None,
            buttons: ButtonRegistry::new(),
            icons: IconSet::new(),
            battery: None,
            gps: None,
            recorder: None,
            recording: defaults.recording,
            power: None,
            idle_tick: Duration::from_millis(defaults.system.idle_tick_ms),
        }
    }

    pub fn camera(mut self, camera: CameraDevice, resolution: Resolution, crop: CropRect) -> Self {
        self.camera = Some(camera);
        self.resolution = resolution;
        self.crop = crop;
        self
    }

    pub fn converter(mut self, converter: Box<dyn FrameConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn surface(mut self, surface: Box<dyn DisplaySurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn touch(mut self, touch: Box<dyn TouchSource>) -> Self {
        self.touch = Some(touch);
        self
    }

    pub fn buttons(mut self, buttons: ButtonRegistry) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn icons(mut self, icons: IconSet) -> Self {
        self.icons = icons;
        self
    }

    pub fn battery(mut self, battery: BatteryPoller) -> Self {
        self.battery = Some(battery);
        self
    }

    pub fn gps(mut self, gps: Arc<GpsPoller>) -> Self {
        self.gps = Some(gps);
        self
    }

    pub fn recorder(mut self, recorder: Arc<dyn SegmentRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn recording(mut self, recording: RecordingConfig) -> Self {
        self.recording = recording;
        self
    }

    pub fn power(mut self, power: Box<dyn PowerControl>) -> Self {
        self.power = Some(power);
        self
    }

    pub fn idle_tick(mut self, idle_tick: Duration) -> Self {
        self.idle_tick = idle_tick;
        self
    }

    pub fn build(self) -> Result<ControlLoop> {
        let camera = self
            .camera
            .ok_or_else(|| DashcamError::system("Camera device must be specified"))?;
        let surface = self
            .surface
            .ok_or_else(|| DashcamError::system("Display surface must be specified"))?;
        let touch = self
            .touch
            .ok_or_else(|| DashcamError::system("Touch source must be specified"))?;
        let recorder = self
            .recorder
            .ok_or_else(|| DashcamError::system("Segment recorder must be specified"))?;
        let power = self
            .power
            .ok_or_else(|| DashcamError::system("Power control must be specified"))?;

        for button in self.buttons.buttons() {
            if let Some(name) = &button.icon {
                if self.icons.get(name).is_none() {
                    warn!("Icon '{}' not found, button drawn without it", name);
                }
            }
        }

        Ok(ControlLoop {
            state: DeviceState::Previewing,
            camera,
            resolution: self.resolution,
            crop: self.crop,
            converter: self.converter.unwrap_or_else(|| Box::new(I420Converter)),
            surface,
            touch,
            buttons: self.buttons,
            icons: self.icons,
            battery: self.battery.unwrap_or_else(BatteryPoller::disabled),
            gps: self.gps.unwrap_or_else(|| Arc::new(GpsPoller::disabled())),
            recorder,
            segment_plan: SegmentPlan::from_config(&self.recording),
            segment_duration: Duration::from_millis(self.recording.segment_duration_ms),
            signals: WorkerSignals::new(),
            worker: None,
            power,
            stats: DisplayStats::default(),
            idle_tick: self.idle_tick,
            shutdown_reason: None,
            last_summary: None,
        })
    }
}

impl Default for ControlLoopBuilder {
    fn default() -> Self {
        Self::new()
    }
}
