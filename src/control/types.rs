use std::fmt;

/// Top-level device state owned by the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Previewing,
    Recording,
    ShuttingDown,
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceState::Previewing => write!(f, "previewing"),
            DeviceState::Recording => write!(f, "recording"),
            DeviceState::ShuttingDown => write!(f, "shutting down"),
        }
    }
}

/// Why the device left its normal operating states
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    LowBattery,
    UserRequest,
    Signal(String),
}

impl ShutdownReason {
    /// Reasons that end with the OS powering off
    pub fn powers_off(&self) -> bool {
        matches!(self, ShutdownReason::LowBattery | ShutdownReason::UserRequest)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Halted,
}
