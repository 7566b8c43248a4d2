use super::icons::Icon;

/// RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Color = Color(0, 0, 0);
    pub const RED: Color = Color(255, 0, 0);
}

/// In-memory RGB24 drawing target with clipped blits
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 3],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some(Color(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]))
    }

    pub fn fill(&mut self, color: Color) {
        for px in self.pixels.chunks_exact_mut(3) {
            px[0] = color.0;
            px[1] = color.1;
            px[2] = color.2;
        }
    }

    /// Copy an RGB24 image with its top-left corner at (x, y), clipping to the canvas
    pub fn blit_rgb(&mut self, src: &[u8], width: u32, height: u32, x: i32, y: i32) {
        let Some((cols, rows)) = self.clip(width, height, x, y) else {
            return;
        };

        for row in rows {
            let src_y = (row - y) as usize;
            let src_start = (src_y * width as usize + (cols.start - x) as usize) * 3;
            let len = (cols.end - cols.start) as usize * 3;
            let dst_start = (row as usize * self.width as usize + cols.start as usize) * 3;
            self.pixels[dst_start..dst_start + len]
                .copy_from_slice(&src[src_start..src_start + len]);
        }
    }

    /// Alpha-blend an RGBA icon with its top-left corner at (x, y)
    pub fn blit_icon(&mut self, icon: &Icon, x: i32, y: i32) {
        let Some((cols, rows)) = self.clip(icon.width, icon.height, x, y) else {
            return;
        };

        for row in rows {
            for col in cols.clone() {
                let s = (((row - y) as usize) * icon.width as usize + (col - x) as usize) * 4;
                let d = (row as usize * self.width as usize + col as usize) * 3;
                let alpha = icon.rgba[s + 3] as u32;
                for c in 0..3 {
                    let src = icon.rgba[s + c] as u32;
                    let dst = self.pixels[d + c] as u32;
                    self.pixels[d + c] = ((src * alpha + dst * (255 - alpha)) / 255) as u8;
                }
            }
        }
    }

    /// Visible column and row ranges (canvas coordinates) of a blit
    fn clip(
        &self,
        width: u32,
        height: u32,
        x: i32,
        y: i32,
    ) -> Option<(std::ops::Range<i32>, std::ops::Range<i32>)> {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + width as i32).min(self.width as i32);
        let y1 = (y + height as i32).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0..x1, y0..y1))
    }
}
