//! Process-level side effects: storage mount, gpsd restart, OS shutdown.

use crate::config::{GpsConfig, SystemConfig};
use crate::control::ShutdownReason;
use crate::error::{DashcamError, Result};
use parking_lot::Mutex;
use std::process::Command;
use std::sync::Arc;
use tracing::{info, warn};

/// Final power-off step of the shutdown sequence
pub trait PowerControl: Send {
    fn shutdown(&mut self, reason: &ShutdownReason) -> Result<()>;
}

/// Flushes filesystems and runs the configured OS shutdown command
pub struct SystemPower {
    command: Vec<String>,
}

impl SystemPower {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(config.shutdown_command.clone())
    }
}

impl PowerControl for SystemPower {
    fn shutdown(&mut self, reason: &ShutdownReason) -> Result<()> {
        info!("Powering off: {:?}", reason);

        // SAFETY: sync(2) takes no arguments and cannot fail
        unsafe { libc::sync() };

        let Some((program, args)) = self.command.split_first() else {
            warn!("No shutdown command configured, leaving power on");
            return Ok(());
        };

        let status = Command::new(program).args(args).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(DashcamError::system(format!(
                "Shutdown command {:?} exited with {}",
                self.command, status
            )))
        }
    }
}

/// Records shutdown requests instead of powering off
#[derive(Default)]
pub struct MockPower {
    requests: Arc<Mutex<Vec<ShutdownReason>>>,
    fail: bool,
}

impl MockPower {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records requests like `new` but reports every power-off as failed
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<ShutdownReason>>> {
        Arc::clone(&self.requests)
    }
}

impl PowerControl for MockPower {
    fn shutdown(&mut self, reason: &ShutdownReason) -> Result<()> {
        self.requests.lock().push(reason.clone());
        if self.fail {
            return Err(DashcamError::system("Mock power-off failure"));
        }
        Ok(())
    }
}

fn privileged(use_sudo: bool, program: &str) -> Command {
    if use_sudo {
        let mut command = Command::new("sudo");
        command.arg(program);
        command
    } else {
        Command::new(program)
    }
}

/// Mount the removable recording medium. Failures are logged; an already
/// mounted device also reports failure here.
pub fn mount_storage(config: &SystemConfig, mount_point: &str) -> bool {
    let result = privileged(config.use_sudo, "mount")
        .args([
            "-t",
            config.mount_fs_type.as_str(),
            config.mount_device.as_str(),
            mount_point,
        ])
        .status();

    match result {
        Ok(status) if status.success() => {
            info!("Mounted {} at {}", config.mount_device, mount_point);
            true
        }
        Ok(status) => {
            warn!(
                "Mounting {} at {} exited with {}",
                config.mount_device, mount_point, status
            );
            false
        }
        Err(e) => {
            warn!("Failed to run mount: {}", e);
            false
        }
    }
}

/// Kill any running gpsd and start a fresh one on the configured serial device
pub fn restart_gpsd(gps: &GpsConfig, system: &SystemConfig) -> bool {
    if let Err(e) = privileged(system.use_sudo, "killall").arg("gpsd").status() {
        warn!("Failed to stop gpsd: {}", e);
    }

    let result = privileged(system.use_sudo, "gpsd")
        .args([gps.serial_device.as_str(), "-F", gps.socket_path.as_str()])
        .status();

    match result {
        Ok(status) if status.success() => {
            info!("Restarted gpsd on {}", gps.serial_device);
            true
        }
        Ok(status) => {
            warn!("gpsd exited with {}", status);
            false
        }
        Err(e) => {
            warn!("Failed to start gpsd: {}", e);
            false
        }
    }
}
