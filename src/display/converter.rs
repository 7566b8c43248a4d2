use crate::error::{DisplayError, Result};
use crate::frame::{FrameData, FrameFormat, RawFrame, RgbFrame};

/// Converts a raw sensor frame into a displayable RGB24 frame
pub trait FrameConverter: Send {
    fn convert(&self, raw: &RawFrame) -> Result<RgbFrame>;
}

/// I420 to RGB24 converter
#[derive(Debug, Clone, Copy, Default)]
pub struct I420Converter;

impl FrameConverter for I420Converter {
    fn convert(&self, raw: &RawFrame) -> Result<RgbFrame> {
        if raw.format != FrameFormat::I420 {
            return Err(DisplayError::FormatConversion {
                details: format!("Expected an I420 frame, got {:?}", raw.format),
            }
            .into());
        }

        let rgb = DisplayConverter::i420_to_rgb24(&raw.data, raw.width, raw.height)?;
        Ok(FrameData::new(
            raw.id,
            raw.timestamp,
            rgb,
            raw.width,
            raw.height,
            FrameFormat::Rgb24,
        ))
    }
}

/// Display format conversion utilities
pub struct DisplayConverter;

impl DisplayConverter {
    /// Convert planar I420 to packed RGB24 (BT.601, studio range)
    pub fn i420_to_rgb24(i420: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
        if width % 2 != 0 || height % 2 != 0 {
            return Err(DisplayError::FormatConversion {
                details: format!("I420 needs even dimensions, got {}x{}", width, height),
            }
            .into());
        }

        let expected_size = FrameFormat::I420.buffer_size(width, height);
        if i420.len() != expected_size {
            return Err(DisplayError::FormatConversion {
                details: format!(
                    "Invalid I420 data size: expected {}, got {}",
                    expected_size,
                    i420.len()
                ),
            }
            .into());
        }

        let w = width as usize;
        let h = height as usize;
        let chroma_w = w / 2;
        let (y_plane, chroma) = i420.split_at(w * h);
        let (u_plane, v_plane) = chroma.split_at(chroma_w * (h / 2));

        let mut rgb = Vec::with_capacity(w * h * 3);
        for row in 0..h {
            for col in 0..w {
                let c = y_plane[row * w + col] as i32 - 16;
                let chroma_index = (row / 2) * chroma_w + col / 2;
                let d = u_plane[chroma_index] as i32 - 128;
                let e = v_plane[chroma_index] as i32 - 128;

                rgb.push(clamp((298 * c + 409 * e + 128) >> 8));
                rgb.push(clamp((298 * c - 100 * d - 208 * e + 128) >> 8));
                rgb.push(clamp((298 * c + 516 * d + 128) >> 8));
            }
        }

        Ok(rgb)
    }

    /// Convert RGB24 to little-endian RGB565 for 16bpp framebuffers
    pub fn rgb24_to_rgb565(rgb24_data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
        let expected_size = FrameFormat::Rgb24.buffer_size(width, height);
        if rgb24_data.len() != expected_size {
            return Err(DisplayError::FormatConversion {
                details: format!(
                    "Invalid RGB24 data size: expected {}, got {}",
                    expected_size,
                    rgb24_data.len()
                ),
            }
            .into());
        }

        let mut rgb565_data = Vec::with_capacity((width * height * 2) as usize);

        for chunk in rgb24_data.chunks_exact(3) {
            let r = chunk[0] >> 3;
            let g = chunk[1] >> 2;
            let b = chunk[2] >> 3;

            let rgb565 = ((r as u16) << 11) | ((g as u16) << 5) | (b as u16);

            rgb565_data.push((rgb565 & 0xFF) as u8);
            rgb565_data.push((rgb565 >> 8) as u8);
        }

        Ok(rgb565_data)
    }

    /// Top-left offset that centers `inner` inside `outer`; negative when inner is larger
    pub fn center_offset(outer: (u32, u32), inner: (u32, u32)) -> (i32, i32) {
        (
            (outer.0 as i32 - inner.0 as i32) / 2,
            (outer.1 as i32 - inner.1 as i32) / 2,
        )
    }
}

fn clamp(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}
