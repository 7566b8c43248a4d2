use std::time::SystemTime;

/// Render path statistics
#[derive(Debug, Clone, Default)]
pub struct DisplayStats {
    pub frames_rendered: u64,
    pub render_errors: u64,
    pub blank_frames: u64,
    pub last_frame_time: Option<SystemTime>,
}

impl DisplayStats {
    pub fn record_frame_render(&mut self) {
        self.frames_rendered += 1;
        self.last_frame_time = Some(SystemTime::now());
    }

    pub fn record_render_error(&mut self) {
        self.render_errors += 1;
    }

    pub fn record_blank_frame(&mut self) {
        self.blank_frames += 1;
    }
}
