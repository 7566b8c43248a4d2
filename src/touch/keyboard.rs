use super::types::{TouchEvent, TouchSource};
use crate::buttons::Point;
use crate::error::{Result, TouchError};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::time::{Duration, SystemTime};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Terminal stand-in for the touchscreen when debugging on a desktop.
///
/// Digit keys tap the center of the matching button (1 = first), space taps
/// the screen center, and q / Esc / Ctrl-C cancel the run.
pub struct KeyboardTouchSource {
    targets: Vec<Point>,
    screen_center: Point,
    cancellation_token: CancellationToken,
}

impl KeyboardTouchSource {
    pub fn new(
        targets: Vec<Point>,
        screen: (u32, u32),
        cancellation_token: CancellationToken,
    ) -> Result<Self> {
        enable_raw_mode().map_err(|e| TouchError::DeviceOpen {
            device: "keyboard".to_string(),
            details: format!("Failed to enable raw mode: {}", e),
        })?;

        info!(
            "Keyboard touch source active - keys 1-{} tap buttons, space taps center, q quits",
            targets.len()
        );

        Ok(Self {
            targets,
            screen_center: Point::new(screen.0 as i32 / 2, screen.1 as i32 / 2),
            cancellation_token,
        })
    }

    fn map_key(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<Point> {
        match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.request_quit();
                None
            }
            KeyCode::Char('q') | KeyCode::Esc => {
                self.request_quit();
                None
            }
            KeyCode::Char(' ') => Some(self.screen_center),
            KeyCode::Char(c) => c
                .to_digit(10)
                .and_then(|d| (d as usize).checked_sub(1))
                .and_then(|index| self.targets.get(index).copied()),
            _ => {
                debug!("Key pressed: {:?}", code);
                None
            }
        }
    }

    fn request_quit(&self) {
        info!("Quit key pressed - requesting exit");
        self.cancellation_token.cancel();
    }
}

impl TouchSource for KeyboardTouchSource {
    fn poll_events(&mut self) -> Result<Vec<TouchEvent>> {
        let mut events = Vec::new();

        while event::poll(Duration::ZERO).map_err(|e| TouchError::DeviceRead {
            details: e.to_string(),
        })? {
            let read = event::read().map_err(|e| TouchError::DeviceRead {
                details: e.to_string(),
            })?;

            if let Event::Key(key_event) = read {
                if key_event.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(point) = self.map_key(key_event.code, key_event.modifiers) {
                    events.push(TouchEvent::press_at(point.x, point.y, SystemTime::now()));
                }
            }
        }

        Ok(events)
    }
}

impl Drop for KeyboardTouchSource {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            error!("Failed to disable raw mode: {}", e);
        } else {
            debug!("Raw mode disabled");
        }
    }
}
