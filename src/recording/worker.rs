use super::command::SegmentRecorder;
use super::segments::{SegmentCounter, SegmentPlan};
use crate::error::RecordingError;
use crate::sensors::GpsPoller;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

const FAILURE_POLL: Duration = Duration::from_millis(50);

/// Flags shared between the control loop and one worker run
#[derive(Debug, Clone, Default)]
pub struct WorkerSignals {
    stop_requested: Arc<AtomicBool>,
    stopped: Arc<AtomicBool>,
}

impl WorkerSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the worker to stop after the segment in progress
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    fn mark_stopped(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn clear(&self) {
        self.stop_requested.store(false, Ordering::Release);
        self.stopped.store(false, Ordering::Release);
    }
}

/// Outcome of one worker run
#[derive(Debug, Clone)]
pub struct RecordingSummary {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub segments_completed: u32,
    pub segments_failed: u32,
    pub next_index: u32,
}

/// Sets the stopped marker however the worker thread exits
struct StoppedGuard(WorkerSignals);

impl Drop for StoppedGuard {
    fn drop(&mut self) {
        self.0.mark_stopped();
    }
}

pub struct RecordingWorker {
    recorder: Arc<dyn SegmentRecorder>,
    gps: Arc<GpsPoller>,
    plan: SegmentPlan,
    segment_duration: Duration,
}

impl RecordingWorker {
    pub fn new(
        recorder: Arc<dyn SegmentRecorder>,
        gps: Arc<GpsPoller>,
        plan: SegmentPlan,
        segment_duration: Duration,
    ) -> Self {
        Self {
            recorder,
            gps,
            plan,
            segment_duration,
        }
    }

    /// Start recording on a background thread.
    ///
    /// The caller must have released the camera. The run records at least one
    /// segment and stops after the first segment that completes with a stop
    /// requested.
    pub fn spawn(self, signals: WorkerSignals) -> Result<RecordingHandle, RecordingError> {
        let thread_signals = signals.clone();

        let handle = thread::Builder::new()
            .name("recording-worker".to_string())
            .spawn(move || {
                let _guard = StoppedGuard(thread_signals.clone());
                self.run(&thread_signals)
            })
            .map_err(|e| RecordingError::Spawn {
                details: e.to_string(),
            })?;

        Ok(RecordingHandle {
            signals,
            handle: Some(handle),
        })
    }

    fn run(&self, signals: &WorkerSignals) -> RecordingSummary {
        let mut summary = RecordingSummary {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            segments_completed: 0,
            segments_failed: 0,
            next_index: 0,
        };
        let mut counter = SegmentCounter::new(self.plan.wrap);

        info!("Recording session {} started", summary.session_id);

        loop {
            let gps_tag = self.gps.latest_fix().to_string();
            let index = counter.advance();
            let path = self.plan.path_for(index);

            info!("Recording segment {} [{}]", path.display(), gps_tag);

            let started = Instant::now();
            match self.recorder.record(&path, self.segment_duration, &gps_tag) {
                Ok(()) => summary.segments_completed += 1,
                Err(e) => {
                    warn!("Segment failed, continuing: {}", e);
                    summary.segments_failed += 1;
                    self.wait_out_segment(started, signals);
                }
            }

            if signals.stop_requested() {
                break;
            }
        }

        summary.next_index = counter.peek();
        info!(
            "Recording session {} stopped: {} segments, {} failed",
            summary.session_id, summary.segments_completed, summary.segments_failed
        );
        summary
    }

    /// Keep the segment cadence after a capture that failed early, returning
    /// as soon as a stop is requested
    fn wait_out_segment(&self, started: Instant, signals: &WorkerSignals) {
        let deadline = started + self.segment_duration;
        while !signals.stop_requested() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep((deadline - now).min(FAILURE_POLL));
        }
    }
}

/// Control-side handle on a running worker
pub struct RecordingHandle {
    signals: WorkerSignals,
    handle: Option<JoinHandle<RecordingSummary>>,
}

impl RecordingHandle {
    pub fn request_stop(&self) {
        self.signals.request_stop();
    }

    pub fn is_finished(&self) -> bool {
        self.signals.is_stopped()
    }

    pub fn signals(&self) -> &WorkerSignals {
        &self.signals
    }

    /// Wait for the worker thread to exit
    pub fn join(mut self) -> Result<RecordingSummary, RecordingError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| RecordingError::WorkerPanicked),
            None => Err(RecordingError::WorkerPanicked),
        }
    }
}
