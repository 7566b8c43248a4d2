use super::command::SegmentRecorder;
use crate::error::RecordingError;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSegment {
    pub path: PathBuf,
    pub duration: Duration,
    pub gps_tag: String,
}

type SegmentHook = Arc<dyn Fn(usize) + Send + Sync>;

#[derive(Default)]
pub struct MockRecorderState {
    pub segments: Vec<RecordedSegment>,
    /// Simulated capture time per segment
    pub delay: Duration,
    pub fail_all: bool,
    /// Called after each segment with the number recorded so far
    pub on_segment: Option<SegmentHook>,
}

/// Segment recorder that logs calls instead of capturing video
pub struct MockSegmentRecorder {
    state: Arc<Mutex<MockRecorderState>>,
}

impl MockSegmentRecorder {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockRecorderState {
                delay: Duration::from_millis(5),
                ..Default::default()
            })),
        }
    }

    pub fn state(&self) -> Arc<Mutex<MockRecorderState>> {
        Arc::clone(&self.state)
    }
}

impl Default for MockSegmentRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentRecorder for MockSegmentRecorder {
    fn record(
        &self,
        path: &Path,
        duration: Duration,
        gps_tag: &str,
    ) -> Result<(), RecordingError> {
        let delay = self.state.lock().delay;
        thread::sleep(delay);

        let (result, count, hook) = {
            let mut state = self.state.lock();
            state.segments.push(RecordedSegment {
                path: path.to_path_buf(),
                duration,
                gps_tag: gps_tag.to_string(),
            });
            let result = if state.fail_all {
                Err(RecordingError::SegmentCapture {
                    path: path.display().to_string(),
                    details: "mock failure".to_string(),
                })
            } else {
                Ok(())
            };
            (result, state.segments.len(), state.on_segment.clone())
        };

        if let Some(hook) = hook {
            hook(count);
        }
        result
    }
}
