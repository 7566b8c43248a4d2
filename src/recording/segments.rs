use crate::config::RecordingConfig;
use std::path::PathBuf;

/// Where segment files go and how they are named
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPlan {
    pub directory: PathBuf,
    pub prefix: String,
    pub extension: String,
    pub wrap: u32,
}

impl SegmentPlan {
    pub fn from_config(config: &RecordingConfig) -> Self {
        Self {
            directory: PathBuf::from(&config.directory),
            prefix: config.file_prefix.clone(),
            extension: config.file_extension.clone(),
            wrap: config.segment_wrap,
        }
    }

    /// `<directory>/<prefix><index>.<extension>`
    pub fn path_for(&self, index: u32) -> PathBuf {
        self.directory
            .join(format!("{}{}.{}", self.prefix, index, self.extension))
    }
}

/// Segment index in `[0, wrap)`; older files are overwritten once it wraps
#[derive(Debug, Clone)]
pub struct SegmentCounter {
    next: u32,
    wrap: u32,
}

impl SegmentCounter {
    pub fn new(wrap: u32) -> Self {
        Self {
            next: 0,
            wrap: wrap.max(1),
        }
    }

    pub fn peek(&self) -> u32 {
        self.next
    }

    /// Take the current index and move to the next one
    pub fn advance(&mut self) -> u32 {
        let current = self.next;
        self.next = (self.next + 1) % self.wrap;
        current
    }
}
