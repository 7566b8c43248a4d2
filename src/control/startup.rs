use super::controller::ControlLoop;
use crate::buttons::ButtonRegistry;
use crate::camera::{CameraDeviceBuilder, CropRect};
use crate::config::DashcamConfig;
use crate::display::{FramebufferSurface, IconSet, I420Converter};
use crate::error::Result;
use crate::recording::CommandRecorder;
use crate::sensors::{BatteryPoller, GpsPoller, GpsdSession, SysfsGpioInput};
use crate::system::{mount_storage, restart_gpsd, SystemPower};
use crate::touch::{KeyboardTouchSource, TouchSource};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Touch device name that selects the terminal keyboard source
pub const KEYBOARD_TOUCH_DEVICE: &str = "keyboard";

/// One-time host preparation before any device is opened
pub fn prepare_system(config: &DashcamConfig) {
    if config.system.mount_storage {
        mount_storage(&config.system, &config.recording.directory);
    }

    if config.gps.enabled && config.gps.restart_daemon {
        restart_gpsd(&config.gps, &config.system);
    }
}

impl ControlLoop {
    /// Build the loop with the hardware backends named in `config`
    pub fn from_config(config: &DashcamConfig, cancel: CancellationToken) -> Result<Self> {
        let camera = CameraDeviceBuilder::new()
            .config(config.camera.clone())
            .build()?;

        let surface =
            FramebufferSurface::open(&config.display.framebuffer_device, config.display.resolution)?;

        let buttons = ButtonRegistry::from_configs(&config.buttons)?;
        let icons = IconSet::load_dir(&config.display.icon_directory);
        info!("Loaded {} icons", icons.len());

        let touch = build_touch_source(config, &buttons, cancel)?;

        let battery = if config.battery.enabled {
            let input = SysfsGpioInput::open(&config.battery.sysfs_root, config.battery.gpio_pin)?;
            BatteryPoller::new(Box::new(input), config.battery.treat_read_failure_as_low)
        } else {
            info!("Battery monitoring disabled");
            BatteryPoller::disabled()
        };

        let gps = if config.gps.enabled {
            GpsPoller::spawn(
                Box::new(GpsdSession::new(&config.gps.host, config.gps.port)),
                Duration::from_millis(config.gps.query_timeout_ms),
            )?
        } else {
            info!("GPS disabled, segments will be tagged without a position");
            GpsPoller::disabled()
        };

        let (x, y, width, height) = config.camera.crop;

        ControlLoop::builder()
            .camera(
                camera,
                config.camera.resolution,
                CropRect::new(x, y, width, height),
            )
            .converter(Box::new(I420Converter))
            .surface(Box::new(surface))
            .touch(touch)
            .buttons(buttons)
            .icons(icons)
            .battery(battery)
            .gps(Arc::new(gps))
            .recorder(Arc::new(CommandRecorder::from_config(&config.recording)))
            .recording(config.recording.clone())
            .power(Box::new(SystemPower::from_config(&config.system)))
            .idle_tick(Duration::from_millis(config.system.idle_tick_ms))
            .build()
    }
}

fn build_touch_source(
    config: &DashcamConfig,
    buttons: &ButtonRegistry,
    cancel: CancellationToken,
) -> Result<Box<dyn TouchSource>> {
    let device = config.display.touch_device.as_str();

    if device == KEYBOARD_TOUCH_DEVICE {
        let targets = buttons.buttons().iter().map(|b| b.rect.center()).collect();
        return Ok(Box::new(KeyboardTouchSource::new(
            targets,
            config.display.resolution,
            cancel,
        )?));
    }

    open_touch_device(device, config.display.resolution)
}

#[cfg(all(target_os = "linux", feature = "touch"))]
fn open_touch_device(device: &str, screen: (u32, u32)) -> Result<Box<dyn TouchSource>> {
    use crate::touch::EvdevTouchSource;
    Ok(Box::new(EvdevTouchSource::open(device, screen)?))
}

#[cfg(not(all(target_os = "linux", feature = "touch")))]
fn open_touch_device(device: &str, _screen: (u32, u32)) -> Result<Box<dyn TouchSource>> {
    use crate::error::TouchError;
    tracing::warn!(
        "Touch device {} requested but evdev support is not built in",
        device
    );
    Err(TouchError::NotAvailable.into())
}
