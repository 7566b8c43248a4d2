use super::controller::ControlLoop;
use super::types::DeviceState;
use crate::display::{Color, DisplayConverter};
use crate::error::Result;
use tracing::{trace, warn};

impl ControlLoop {
    /// Draw one frame for the current state. Only lease errors escape.
    pub(super) fn render_tick(&mut self) -> Result<()> {
        match self.state {
            DeviceState::Previewing => match self.render_preview() {
                Ok(()) => {
                    self.stats.record_frame_render();
                    Ok(())
                }
                Err(e) if e.is_contract_violation() => Err(e),
                Err(e) => {
                    self.stats.record_render_error();
                    warn!("Preview frame dropped: {}", e);
                    Ok(())
                }
            },
            DeviceState::Recording => {
                self.surface.fill(Color::BLACK);
                if let Err(e) = self.surface.present() {
                    warn!("Failed to present blank frame: {}", e);
                }
                self.stats.record_blank_frame();
                Ok(())
            }
            DeviceState::ShuttingDown => Ok(()),
        }
    }

    fn render_preview(&mut self) -> Result<()> {
        let raw = self.camera.capture_frame()?;
        let frame = self.converter.convert(&raw)?;

        let display_size = self.surface.size();
        if frame.width < display_size.0 || frame.height < display_size.1 {
            self.surface.fill(Color::BLACK);
        }

        let (x, y) = DisplayConverter::center_offset(display_size, (frame.width, frame.height));
        self.surface.blit_rgb(&frame.data, frame.width, frame.height, x, y);

        for button in self.buttons.buttons() {
            let Some(icon) = button.icon.as_deref().and_then(|name| self.icons.get(name)) else {
                continue;
            };
            let position = button.icon_position(icon.width, icon.height);
            self.surface.blit_icon(icon, position.x, position.y);
        }

        trace!("Presenting preview frame {} ({} ms after capture)", frame.id, frame.age_ms());
        self.surface.present()
    }
}
