use std::time::SystemTime;

/// Pixel layout of a frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// Planar YUV 4:2:0 - full-size Y plane followed by quarter-size U and V planes
    I420,
    /// Packed 8-bit RGB
    Rgb24,
}

impl FrameFormat {
    /// Buffer size in bytes for a frame of the given dimensions
    pub fn buffer_size(&self, width: u32, height: u32) -> usize {
        let pixels = width as usize * height as usize;
        match self {
            FrameFormat::I420 => pixels * 3 / 2,
            FrameFormat::Rgb24 => pixels * 3,
        }
    }
}

/// A single frame buffer with capture metadata
#[derive(Debug, Clone)]
pub struct FrameData {
    /// Frame identifier, increasing per camera lease
    pub id: u64,
    /// Timestamp when frame was captured
    pub timestamp: SystemTime,
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: FrameFormat,
}

/// A frame straight from the sensor
pub type RawFrame = FrameData;

/// A frame ready to blit
pub type RgbFrame = FrameData;

impl FrameData {
    pub fn new(
        id: u64,
        timestamp: SystemTime,
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: FrameFormat,
    ) -> Self {
        Self {
            id,
            timestamp,
            data,
            width,
            height,
            format,
        }
    }

    pub fn expected_size(&self) -> usize {
        self.format.buffer_size(self.width, self.height)
    }

    /// Validate frame data size against expected size
    pub fn validate_size(&self) -> bool {
        self.data.len() == self.expected_size()
    }

    /// Get frame age in milliseconds
    pub fn age_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(self.timestamp)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_sizes() {
        assert_eq!(FrameFormat::I420.buffer_size(320, 240), 115_200);
        assert_eq!(FrameFormat::Rgb24.buffer_size(320, 240), 230_400);
    }

    #[test]
    fn test_frame_size_validation() {
        let good = FrameData::new(
            1,
            SystemTime::now(),
            vec![0u8; 6],
            2,
            2,
            FrameFormat::I420,
        );
        assert!(good.validate_size());

        let bad = FrameData::new(
            2,
            SystemTime::now(),
            vec![0u8; 6],
            2,
            2,
            FrameFormat::Rgb24,
        );
        assert!(!bad.validate_size());
        assert_eq!(bad.expected_size(), 12);
    }

    #[test]
    fn test_frame_age() {
        let frame = FrameData::new(1, SystemTime::now(), Vec::new(), 0, 0, FrameFormat::I420);
        assert!(frame.age_ms() < 1_000);
    }
}
