//! Segmented video recording on a background worker thread.

mod command;
mod mock;
mod segments;
mod worker;

pub use command::{CommandRecorder, SegmentRecorder};
pub use mock::{MockRecorderState, MockSegmentRecorder, RecordedSegment};
pub use segments::{SegmentCounter, SegmentPlan};
pub use worker::{RecordingHandle, RecordingSummary, RecordingWorker, WorkerSignals};
