use super::canvas::{Canvas, Color};
use super::converter::DisplayConverter;
use super::icons::Icon;
use super::surface::DisplaySurface;
use crate::error::{DisplayError, Result};
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use tracing::{info, trace};

/// 16bpp Linux framebuffer surface (PiTFT and similar panels)
pub struct FramebufferSurface {
    device_path: String,
    device: File,
    canvas: Canvas,
}

impl FramebufferSurface {
    pub fn open(device_path: &str, resolution: (u32, u32)) -> Result<Self> {
        let device = OpenOptions::new()
            .write(true)
            .open(device_path)
            .map_err(|e| DisplayError::Framebuffer {
                details: format!("Failed to open {}: {}", device_path, e),
            })?;

        info!(
            "Framebuffer {} opened ({}x{} RGB565)",
            device_path, resolution.0, resolution.1
        );

        Ok(Self {
            device_path: device_path.to_string(),
            device,
            canvas: Canvas::new(resolution.0, resolution.1),
        })
    }
}

impl DisplaySurface for FramebufferSurface {
    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn fill(&mut self, color: Color) {
        self.canvas.fill(color);
    }

    fn blit_rgb(&mut self, rgb: &[u8], width: u32, height: u32, x: i32, y: i32) {
        self.canvas.blit_rgb(rgb, width, height, x, y);
    }

    fn blit_icon(&mut self, icon: &Icon, x: i32, y: i32) {
        self.canvas.blit_icon(icon, x, y);
    }

    fn present(&mut self) -> Result<()> {
        let rgb565 = DisplayConverter::rgb24_to_rgb565(
            self.canvas.pixels(),
            self.canvas.width(),
            self.canvas.height(),
        )?;

        self.device
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.device.write_all(&rgb565))
            .map_err(|e| DisplayError::Framebuffer {
                details: format!("Failed to write {}: {}", self.device_path, e),
            })?;

        trace!("Presented {} bytes to {}", rgb565.len(), self.device_path);
        Ok(())
    }
}
