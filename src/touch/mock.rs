use super::types::{TouchEvent, TouchSource};
use crate::error::Result;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::SystemTime;

/// Pending batches for a [`ScriptedTouchSource`]
#[derive(Debug, Default)]
pub struct TouchScript {
    pub batches: VecDeque<Vec<TouchEvent>>,
    pub polls: u32,
}

impl TouchScript {
    /// Queue a single press at (x, y) as its own batch
    pub fn tap(&mut self, x: i32, y: i32) {
        self.batches
            .push_back(vec![TouchEvent::press_at(x, y, SystemTime::now())]);
    }

    pub fn push_batch(&mut self, events: Vec<TouchEvent>) {
        self.batches.push_back(events);
    }
}

/// Touch source replaying queued batches, one batch per poll
pub struct ScriptedTouchSource {
    script: Arc<Mutex<TouchScript>>,
}

impl ScriptedTouchSource {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(TouchScript::default())),
        }
    }

    pub fn script(&self) -> Arc<Mutex<TouchScript>> {
        Arc::clone(&self.script)
    }
}

impl Default for ScriptedTouchSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TouchSource for ScriptedTouchSource {
    fn poll_events(&mut self) -> Result<Vec<TouchEvent>> {
        let mut script = self.script.lock();
        script.polls += 1;
        Ok(script.batches.pop_front().unwrap_or_default())
    }
}
