//! The control loop: preview, record and shutdown state machine.

mod controller;
mod render;
mod runtime;
mod startup;
mod types;
#[cfg(test)]
mod tests;

pub use controller::{ControlLoop, ControlLoopBuilder};
pub use runtime::wait_for_shutdown_signal;
pub use startup::{prepare_system, KEYBOARD_TOUCH_DEVICE};
pub use types::{DeviceState, ShutdownReason, TickOutcome};
