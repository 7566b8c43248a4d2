use super::types::{TouchEvent, TouchEventType, TouchSource};
use crate::error::{Result, TouchError};
use evdev::{AbsoluteAxisType, Device, EventType, InputEvent, InputEventKind, Key, Synchronization};
use std::os::unix::io::AsRawFd;
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Non-blocking evdev touchscreen reader.
///
/// Presses are reported at the next SYN_REPORT so that the coordinates sent
/// in the same report are already known.
pub struct EvdevTouchSource {
    pub(crate) device_path: String,
    device: Device,
    tracker: TouchTracker,
}

impl EvdevTouchSource {
    pub fn open(device_path: &str, screen: (u32, u32)) -> std::result::Result<Self, TouchError> {
        let device = Device::open(device_path).map_err(|e| TouchError::DeviceOpen {
            device: device_path.to_string(),
            details: e.to_string(),
        })?;

        info!(
            "Touch device opened successfully: {} ({})",
            device_path,
            device.name().unwrap_or("Unknown")
        );
        debug!("Device capabilities: {:?}", device.supported_events());

        if !device.supported_events().contains(EventType::KEY) {
            warn!("Device {} does not report key events", device_path);
        }

        set_nonblocking(&device).map_err(|e| TouchError::DeviceOpen {
            device: device_path.to_string(),
            details: format!("Failed to set non-blocking mode: {}", e),
        })?;

        let (x_range, y_range) = match device.get_abs_state() {
            Ok(state) => {
                let x = &state[AbsoluteAxisType::ABS_X.0 as usize];
                let y = &state[AbsoluteAxisType::ABS_Y.0 as usize];
                (
                    Some((x.minimum, x.maximum)),
                    Some((y.minimum, y.maximum)),
                )
            }
            Err(e) => {
                warn!("No absolute axis info for {}: {}", device_path, e);
                (None, None)
            }
        };

        Ok(Self {
            device_path: device_path.to_string(),
            device,
            tracker: TouchTracker::new(screen, x_range, y_range),
        })
    }
}

impl TouchSource for EvdevTouchSource {
    fn poll_events(&mut self) -> Result<Vec<TouchEvent>> {
        let raw: Vec<InputEvent> = match self.device.fetch_events() {
            Ok(events) => events.collect(),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => return Ok(Vec::new()),
            Err(e) => {
                return Err(TouchError::DeviceRead {
                    details: format!("{}: {}", self.device_path, e),
                }
                .into())
            }
        };

        Ok(raw
            .iter()
            .filter_map(|event| self.tracker.process(event))
            .collect())
    }
}

fn set_nonblocking(device: &Device) -> std::io::Result<()> {
    let fd = device.as_raw_fd();
    // SAFETY: fd is owned by `device` and stays open for the duration of both calls
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(std::io::Error::last_os_error());
    }
    if unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

/// Folds raw evdev events into screen-space touch events
pub(crate) struct TouchTracker {
    screen: (u32, u32),
    x_range: Option<(i32, i32)>,
    y_range: Option<(i32, i32)>,
    raw_position: (Option<i32>, Option<i32>),
    pending_press: bool,
}

impl TouchTracker {
    pub(crate) fn new(
        screen: (u32, u32),
        x_range: Option<(i32, i32)>,
        y_range: Option<(i32, i32)>,
    ) -> Self {
        Self {
            screen,
            x_range,
            y_range,
            raw_position: (None, None),
            pending_press: false,
        }
    }

    pub(crate) fn process(&mut self, event: &InputEvent) -> Option<TouchEvent> {
        match event.kind() {
            InputEventKind::Key(Key::BTN_TOUCH) | InputEventKind::Key(Key::BTN_LEFT) => {
                match event.value() {
                    1 => {
                        self.pending_press = true;
                        None
                    }
                    0 => Some(TouchEvent::release(SystemTime::now())),
                    _ => None,
                }
            }
            InputEventKind::AbsAxis(AbsoluteAxisType::ABS_X)
            | InputEventKind::AbsAxis(AbsoluteAxisType::ABS_MT_POSITION_X) => {
                self.raw_position.0 = Some(event.value());
                None
            }
            InputEventKind::AbsAxis(AbsoluteAxisType::ABS_Y)
            | InputEventKind::AbsAxis(AbsoluteAxisType::ABS_MT_POSITION_Y) => {
                self.raw_position.1 = Some(event.value());
                None
            }
            InputEventKind::Synchronization(Synchronization::SYN_REPORT) if self.pending_press => {
                self.pending_press = false;
                Some(TouchEvent {
                    event_type: TouchEventType::Press,
                    x: self
                        .raw_position
                        .0
                        .map(|x| scale(x, self.x_range, self.screen.0)),
                    y: self
                        .raw_position
                        .1
                        .map(|y| scale(y, self.y_range, self.screen.1)),
                    timestamp: SystemTime::now(),
                })
            }
            _ => None,
        }
    }
}

/// Map a raw axis value onto 0..screen_len-1
fn scale(value: i32, range: Option<(i32, i32)>, screen_len: u32) -> i32 {
    match range {
        Some((min, max)) if max > min => {
            let span = (max - min) as i64;
            let offset = (value.clamp(min, max) - min) as i64;
            (offset * (screen_len as i64 - 1) / span) as i32
        }
        _ => value,
    }
}
