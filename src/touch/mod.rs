#[cfg(all(target_os = "linux", feature = "touch"))]
mod evdev_source;
mod keyboard;
mod mock;
mod types;

#[cfg(all(target_os = "linux", feature = "touch"))]
pub use evdev_source::EvdevTouchSource;
pub use keyboard::KeyboardTouchSource;
pub use mock::{ScriptedTouchSource, TouchScript};
pub use types::{TouchErrorExt, TouchEvent, TouchEventType, TouchSource};
