use super::canvas::{Canvas, Color};
use super::icons::Icon;
use super::surface::DisplaySurface;
use crate::error::Result;
use parking_lot::Mutex;
use std::sync::Arc;

/// What a [`MemorySurface`] has been asked to do
#[derive(Debug, Clone, Default)]
pub struct MemorySurfaceState {
    pub presents: u32,
    pub fills: Vec<Color>,
    pub frame_blits: u32,
    pub icon_blits: Vec<String>,
    /// Canvas contents at the last present
    pub last_presented: Option<Canvas>,
}

/// Display surface that keeps everything in memory
pub struct MemorySurface {
    canvas: Canvas,
    state: Arc<Mutex<MemorySurfaceState>>,
}

impl MemorySurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: Canvas::new(width, height),
            state: Arc::new(Mutex::new(MemorySurfaceState::default())),
        }
    }

    pub fn state(&self) -> Arc<Mutex<MemorySurfaceState>> {
        Arc::clone(&self.state)
    }
}

impl DisplaySurface for MemorySurface {
    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn fill(&mut self, color: Color) {
        self.canvas.fill(color);
        self.state.lock().fills.push(color);
    }

    fn blit_rgb(&mut self, rgb: &[u8], width: u32, height: u32, x: i32, y: i32) {
        self.canvas.blit_rgb(rgb, width, height, x, y);
        self.state.lock().frame_blits += 1;
    }

    fn blit_icon(&mut self, icon: &Icon, x: i32, y: i32) {
        self.canvas.blit_icon(icon, x, y);
        self.state.lock().icon_blits.push(icon.name.clone());
    }

    fn present(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        state.presents += 1;
        state.last_presented = Some(self.canvas.clone());
        Ok(())
    }
}
