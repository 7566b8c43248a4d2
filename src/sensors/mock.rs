use super::battery::DigitalInput;
use super::gps::{GpsReport, LocationSource};
use crate::error::SensorError;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug)]
pub struct MockInputState {
    pub level: bool,
    pub fail_reads: bool,
    pub reads: u32,
}

/// Digital input whose level tests flip through a shared handle
pub struct MockDigitalInput {
    state: Arc<Mutex<MockInputState>>,
}

impl MockDigitalInput {
    pub fn new(level: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockInputState {
                level,
                fail_reads: false,
                reads: 0,
            })),
        }
    }

    pub fn state(&self) -> Arc<Mutex<MockInputState>> {
        Arc::clone(&self.state)
    }
}

impl DigitalInput for MockDigitalInput {
    fn read_level(&mut self) -> Result<bool, SensorError> {
        let mut state = self.state.lock();
        state.reads += 1;
        if state.fail_reads {
            return Err(SensorError::unavailable("battery", "mock read failure"));
        }
        Ok(state.level)
    }
}

/// Replays queued gpsd reports, then idles
pub struct ScriptedLocationSource {
    reports: Arc<Mutex<VecDeque<Result<GpsReport, SensorError>>>>,
    idle: Duration,
}

impl ScriptedLocationSource {
    pub fn new() -> Self {
        Self {
            reports: Arc::new(Mutex::new(VecDeque::new())),
            idle: Duration::from_millis(5),
        }
    }

    pub fn reports(&self) -> Arc<Mutex<VecDeque<Result<GpsReport, SensorError>>>> {
        Arc::clone(&self.reports)
    }

    /// Queue a TPV report at the given position
    pub fn push_fix(&self, latitude: f64, longitude: f64) {
        self.reports.lock().push_back(Ok(GpsReport {
            class: "TPV".to_string(),
            mode: Some(3),
            lat: Some(latitude),
            lon: Some(longitude),
        }));
    }
}

impl Default for ScriptedLocationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationSource for ScriptedLocationSource {
    fn next_report(&mut self) -> Result<Option<GpsReport>, SensorError> {
        let next = self.reports.lock().pop_front();
        match next {
            Some(report) => report.map(Some),
            None => {
                thread::sleep(self.idle);
                Ok(None)
            }
        }
    }
}
