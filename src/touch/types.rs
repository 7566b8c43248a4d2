use crate::buttons::Point;
use crate::error::{Result, TouchError};
use std::time::SystemTime;

/// Touch event types for more detailed event handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEventType {
    Press,
    Release,
    Move,
}

/// Detailed touch event information, coordinates in screen pixels
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub event_type: TouchEventType,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub timestamp: SystemTime,
}

impl TouchEvent {
    pub fn press(timestamp: SystemTime) -> Self {
        Self {
            event_type: TouchEventType::Press,
            x: None,
            y: None,
            timestamp,
        }
    }

    pub fn press_at(x: i32, y: i32, timestamp: SystemTime) -> Self {
        Self {
            event_type: TouchEventType::Press,
            x: Some(x),
            y: Some(y),
            timestamp,
        }
    }

    pub fn release(timestamp: SystemTime) -> Self {
        Self {
            event_type: TouchEventType::Release,
            x: None,
            y: None,
            timestamp,
        }
    }

    pub fn is_press(&self) -> bool {
        self.event_type == TouchEventType::Press
    }

    pub fn position(&self) -> Option<Point> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Point::new(x, y)),
            _ => None,
        }
    }
}

/// Source of pending touch events, polled once per tick without blocking
pub trait TouchSource: Send {
    fn poll_events(&mut self) -> Result<Vec<TouchEvent>>;
}

pub trait TouchErrorExt {
    fn is_recoverable(&self) -> bool;
    fn user_message(&self) -> String;
}

impl TouchErrorExt for TouchError {
    fn is_recoverable(&self) -> bool {
        matches!(self, TouchError::DeviceRead { .. })
    }

    fn user_message(&self) -> String {
        match self {
            TouchError::DeviceOpen { device, .. } => {
                format!("Touch device not found at {}", device)
            }
            TouchError::DeviceRead { details } => format!("Touch device read error: {}", details),
            TouchError::NotAvailable => "Touch input not available on this system".to_string(),
        }
    }
}
