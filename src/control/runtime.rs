use super::controller::ControlLoop;
use super::types::{DeviceState, ShutdownReason, TickOutcome};
use crate::error::Result;
use std::thread;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

impl ControlLoop {
    /// Tick until the device shuts down or `cancel` fires
    pub fn run(&mut self, cancel: &CancellationToken) -> Result<ShutdownReason> {
        info!("Dashcam control loop running");

        loop {
            if cancel.is_cancelled() {
                let reason = ShutdownReason::Signal("cancelled".to_string());
                self.stop(reason.clone());
                return Ok(reason);
            }

            let outcome = match self.tick() {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Control loop failed: {}", e);
                    if self.state == DeviceState::ShuttingDown {
                        // Power-off failed; the worker is already stopping and is not waited on
                        self.camera.release();
                    } else {
                        self.stop(ShutdownReason::Signal("error".to_string()));
                    }
                    return Err(e);
                }
            };

            match outcome {
                TickOutcome::Halted => {
                    return Ok(self
                        .shutdown_reason
                        .clone()
                        .unwrap_or(ShutdownReason::UserRequest));
                }
                TickOutcome::Continue if self.needs_idle_sleep() => {
                    thread::sleep(self.idle_tick);
                }
                TickOutcome::Continue => {}
            }
        }
    }

    /// Recording renders no frames, and some backends return frames instantly
    pub(super) fn needs_idle_sleep(&self) -> bool {
        self.state == DeviceState::Recording || !self.camera.paces_capture()
    }
}

/// Wait for SIGINT or SIGTERM
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> ShutdownReason {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            error!("Failed to register SIGTERM handler: {}", e);
            return ctrl_c().await;
        }
    };

    tokio::select! {
        reason = ctrl_c() => reason,
        _ = sigterm.recv() => {
            info!("Received SIGTERM signal");
            ShutdownReason::Signal("SIGTERM".to_string())
        }
    }
}

/// Wait for Ctrl+C
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> ShutdownReason {
    ctrl_c().await
}

async fn ctrl_c() -> ShutdownReason {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received SIGINT signal (Ctrl+C)");
    ShutdownReason::Signal("SIGINT".to_string())
}
