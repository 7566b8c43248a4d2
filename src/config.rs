use crate::buttons::ButtonAction;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DashcamConfig {
    pub camera: CameraConfig,
    pub display: DisplayConfig,
    pub recording: RecordingConfig,
    pub gps: GpsConfig,
    pub battery: BatteryConfig,
    pub system: SystemConfig,
    #[serde(default = "default_buttons")]
    pub buttons: Vec<ButtonConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CameraBackendKind {
    /// GStreamer capture pipeline (requires the `camera` feature)
    Gstreamer,
    /// Synthetic frames for running without camera hardware
    TestPattern,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CameraConfig {
    /// Capture backend
    #[serde(default = "default_camera_backend")]
    pub backend: CameraBackendKind,

    /// GStreamer source element (e.g. libcamerasrc, v4l2src device=/dev/video0)
    #[serde(default = "default_camera_source")]
    pub source: String,

    /// Preview resolution (width, height)
    #[serde(default = "default_camera_resolution")]
    pub resolution: (u32, u32),

    /// Normalised crop rectangle (x, y, width, height) in [0, 1]
    #[serde(default = "default_camera_crop")]
    pub crop: (f64, f64, f64, f64),

    /// Maximum time to wait for a single preview frame
    #[serde(default = "default_capture_timeout_ms")]
    pub capture_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DisplayConfig {
    /// Framebuffer device path
    #[serde(default = "default_framebuffer_device")]
    pub framebuffer_device: String,

    /// Touch input device path, or "keyboard" for the terminal debug source
    #[serde(default = "default_touch_device")]
    pub touch_device: String,

    /// Display resolution (width, height)
    #[serde(default = "default_display_resolution")]
    pub resolution: (u32, u32),

    /// Directory scanned for *.png button icons
    #[serde(default = "default_icon_directory")]
    pub icon_directory: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RecordingConfig {
    /// Directory segments are written to (also the removable-media mount point)
    #[serde(default = "default_recording_directory")]
    pub directory: String,

    /// Segment file name prefix
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Segment file extension
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// Duration of one segment in milliseconds
    #[serde(default = "default_segment_duration_ms")]
    pub segment_duration_ms: u64,

    /// Number of segment files before the counter wraps back to 0
    #[serde(default = "default_segment_wrap")]
    pub segment_wrap: u32,

    /// External capture command
    #[serde(default = "default_recording_command")]
    pub command: String,

    /// Extra arguments passed between the duration and the GPS annotation
    #[serde(default = "default_recording_extra_args")]
    pub extra_args: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GpsConfig {
    /// Query gpsd for segment annotations
    #[serde(default = "default_gps_enabled")]
    pub enabled: bool,

    /// gpsd host
    #[serde(default = "default_gps_host")]
    pub host: String,

    /// gpsd port
    #[serde(default = "default_gps_port")]
    pub port: u16,

    /// Upper bound on a single fix query
    #[serde(default = "default_gps_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Kill and relaunch gpsd at startup
    #[serde(default = "default_gps_restart_daemon")]
    pub restart_daemon: bool,

    /// Serial device handed to gpsd on restart
    #[serde(default = "default_gps_serial_device")]
    pub serial_device: String,

    /// Control socket handed to gpsd on restart
    #[serde(default = "default_gps_socket_path")]
    pub socket_path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BatteryConfig {
    /// Monitor the low-battery pin
    #[serde(default = "default_battery_enabled")]
    pub enabled: bool,

    /// BCM pin number of the low-battery signal
    #[serde(default = "default_battery_gpio_pin")]
    pub gpio_pin: u32,

    /// sysfs GPIO root
    #[serde(default = "default_battery_sysfs_root")]
    pub sysfs_root: String,

    /// Treat a failed pin read as a low-battery reading
    #[serde(default = "default_treat_read_failure_as_low")]
    pub treat_read_failure_as_low: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SystemConfig {
    /// Mount removable storage at startup
    #[serde(default = "default_mount_storage")]
    pub mount_storage: bool,

    /// Block device mounted at the recording directory
    #[serde(default = "default_mount_device")]
    pub mount_device: String,

    /// Filesystem type of the removable storage
    #[serde(default = "default_mount_fs_type")]
    pub mount_fs_type: String,

    /// Prefix privileged commands with sudo
    #[serde(default = "default_use_sudo")]
    pub use_sudo: bool,

    /// OS shutdown command; empty logs the request instead
    #[serde(default = "default_shutdown_command")]
    pub shutdown_command: Vec<String>,

    /// Sleep between ticks while recording (no capture paces the loop)
    #[serde(default = "default_idle_tick_ms")]
    pub idle_tick_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ButtonConfig {
    /// Hit rectangle (x, y, width, height)
    pub rect: (i32, i32, u32, u32),

    /// Icon name (PNG file stem in the icon directory)
    #[serde(default)]
    pub icon: Option<String>,

    /// Bound action
    #[serde(default)]
    pub action: Option<ButtonAction>,

    /// Parameter handed to the action
    #[serde(default)]
    pub param: Option<String>,
}

impl DashcamConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("dashcam.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let (camera_width, camera_height) = default_camera_resolution();
        let (display_width, display_height) = default_display_resolution();
        let (crop_x, crop_y, crop_w, crop_h) = default_camera_crop();

        let settings = Config::builder()
            // Start with default values
            .set_default("camera.backend", "gstreamer")?
            .set_default("camera.source", default_camera_source())?
            .set_default("camera.resolution", vec![camera_width, camera_height])?
            .set_default("camera.crop", vec![crop_x, crop_y, crop_w, crop_h])?
            .set_default("camera.capture_timeout_ms", default_capture_timeout_ms())?
            .set_default("display.framebuffer_device", default_framebuffer_device())?
            .set_default("display.touch_device", default_touch_device())?
            .set_default(
                "display.resolution",
                vec![display_width, display_height],
            )?
            .set_default("display.icon_directory", default_icon_directory())?
            .set_default("recording.directory", default_recording_directory())?
            .set_default("recording.file_prefix", default_file_prefix())?
            .set_default("recording.file_extension", default_file_extension())?
            .set_default(
                "recording.segment_duration_ms",
                default_segment_duration_ms(),
            )?
            .set_default("recording.segment_wrap", default_segment_wrap())?
            .set_default("recording.command", default_recording_command())?
            .set_default("recording.extra_args", default_recording_extra_args())?
            .set_default("gps.enabled", default_gps_enabled())?
            .set_default("gps.host", default_gps_host())?
            .set_default("gps.port", default_gps_port())?
            .set_default("gps.query_timeout_ms", default_gps_query_timeout_ms())?
            .set_default("gps.restart_daemon", default_gps_restart_daemon())?
            .set_default("gps.serial_device", default_gps_serial_device())?
            .set_default("gps.socket_path", default_gps_socket_path())?
            .set_default("battery.enabled", default_battery_enabled())?
            .set_default("battery.gpio_pin", default_battery_gpio_pin())?
            .set_default("battery.sysfs_root", default_battery_sysfs_root())?
            .set_default(
                "battery.treat_read_failure_as_low",
                default_treat_read_failure_as_low(),
            )?
            .set_default("system.mount_storage", default_mount_storage())?
            .set_default("system.mount_device", default_mount_device())?
            .set_default("system.mount_fs_type", default_mount_fs_type())?
            .set_default("system.use_sudo", default_use_sudo())?
            .set_default("system.shutdown_command", default_shutdown_command())?
            .set_default("system.idle_tick_ms", default_idle_tick_ms())?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // Add environment variables, e.g. DASHCAM__GPS__PORT
            .add_source(Environment::with_prefix("DASHCAM").separator("__"))
            .build()?;

        let config: DashcamConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.resolution.0 == 0 || self.camera.resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Camera resolution must be greater than 0".to_string(),
            ));
        }

        // I420 chroma planes are subsampled 2x2
        if self.camera.resolution.0 % 2 != 0 || self.camera.resolution.1 % 2 != 0 {
            return Err(ConfigError::Message(
                "Camera resolution must be even in both dimensions".to_string(),
            ));
        }

        let (x, y, w, h) = self.camera.crop;
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !(in_unit(x) && in_unit(y) && in_unit(w) && in_unit(h)) || w == 0.0 || h == 0.0 {
            return Err(ConfigError::Message(
                "Camera crop must be a non-empty rectangle within [0, 1]".to_string(),
            ));
        }

        if x + w > 1.0 || y + h > 1.0 {
            return Err(ConfigError::Message(
                "Camera crop must not extend past the sensor edge".to_string(),
            ));
        }

        if self.display.resolution.0 == 0 || self.display.resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Display resolution must be greater than 0".to_string(),
            ));
        }

        if self.recording.segment_duration_ms == 0 {
            return Err(ConfigError::Message(
                "Recording segment_duration_ms must be greater than 0".to_string(),
            ));
        }

        if self.recording.segment_wrap == 0 {
            return Err(ConfigError::Message(
                "Recording segment_wrap must be greater than 0".to_string(),
            ));
        }

        if self.recording.command.trim().is_empty() {
            return Err(ConfigError::Message(
                "Recording command must not be empty".to_string(),
            ));
        }

        if self.gps.query_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "GPS query_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.buttons.is_empty() {
            return Err(ConfigError::Message(
                "At least one button must be configured".to_string(),
            ));
        }

        for (index, button) in self.buttons.iter().enumerate() {
            if button.rect.2 == 0 || button.rect.3 == 0 {
                return Err(ConfigError::Message(format!(
                    "Button {} must have a positive width and height",
                    index
                )));
            }
        }

        Ok(())
    }
}

impl Default for DashcamConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig {
                backend: default_camera_backend(),
                source: default_camera_source(),
                resolution: default_camera_resolution(),
                crop: default_camera_crop(),
                capture_timeout_ms: default_capture_timeout_ms(),
            },
            display: DisplayConfig {
                framebuffer_device: default_framebuffer_device(),
                touch_device: default_touch_device(),
                resolution: default_display_resolution(),
                icon_directory: default_icon_directory(),
            },
            recording: RecordingConfig {
                directory: default_recording_directory(),
                file_prefix: default_file_prefix(),
                file_extension: default_file_extension(),
                segment_duration_ms: default_segment_duration_ms(),
                segment_wrap: default_segment_wrap(),
                command: default_recording_command(),
                extra_args: default_recording_extra_args(),
            },
            gps: GpsConfig {
                enabled: default_gps_enabled(),
                host: default_gps_host(),
                port: default_gps_port(),
                query_timeout_ms: default_gps_query_timeout_ms(),
                restart_daemon: default_gps_restart_daemon(),
                serial_device: default_gps_serial_device(),
                socket_path: default_gps_socket_path(),
            },
            battery: BatteryConfig {
                enabled: default_battery_enabled(),
                gpio_pin: default_battery_gpio_pin(),
                sysfs_root: default_battery_sysfs_root(),
                treat_read_failure_as_low: default_treat_read_failure_as_low(),
            },
            system: SystemConfig {
                mount_storage: default_mount_storage(),
                mount_device: default_mount_device(),
                mount_fs_type: default_mount_fs_type(),
                use_sudo: default_use_sudo(),
                shutdown_command: default_shutdown_command(),
                idle_tick_ms: default_idle_tick_ms(),
            },
            buttons: default_buttons(),
        }
    }
}

// Default value functions
fn default_camera_backend() -> CameraBackendKind {
    CameraBackendKind::Gstreamer
}
fn default_camera_source() -> String {
    "libcamerasrc".to_string()
}
fn default_camera_resolution() -> (u32, u32) {
    (320, 240)
}
fn default_camera_crop() -> (f64, f64, f64, f64) {
    (0.0, 0.0, 1.0, 1.0)
}
fn default_capture_timeout_ms() -> u64 {
    1000
}

fn default_framebuffer_device() -> String {
    "/dev/fb1".to_string()
}
fn default_touch_device() -> String {
    "/dev/input/touchscreen".to_string()
}
fn default_display_resolution() -> (u32, u32) {
    (320, 240)
}
fn default_icon_directory() -> String {
    "/home/pi/dashcam/media".to_string()
}

fn default_recording_directory() -> String {
    "/media/usb".to_string()
}
fn default_file_prefix() -> String {
    "dash".to_string()
}
fn default_file_extension() -> String {
    "h264".to_string()
}
fn default_segment_duration_ms() -> u64 {
    15_000
}
fn default_segment_wrap() -> u32 {
    135
} // ~34 minutes of 15s segments, sized for a 4GB stick
fn default_recording_command() -> String {
    "raspivid".to_string()
}
fn default_recording_extra_args() -> Vec<String> {
    vec!["-ae".to_string(), "60,0xff,0x808000".to_string()]
}

fn default_gps_enabled() -> bool {
    true
}
fn default_gps_host() -> String {
    "localhost".to_string()
}
fn default_gps_port() -> u16 {
    2947
}
fn default_gps_query_timeout_ms() -> u64 {
    1000
}
fn default_gps_restart_daemon() -> bool {
    false
}
fn default_gps_serial_device() -> String {
    "/dev/ttyS0".to_string()
}
fn default_gps_socket_path() -> String {
    "/var/run/gpsd.sock".to_string()
}

fn default_battery_enabled() -> bool {
    true
}
fn default_battery_gpio_pin() -> u32 {
    21
}
fn default_battery_sysfs_root() -> String {
    "/sys/class/gpio".to_string()
}
fn default_treat_read_failure_as_low() -> bool {
    true
}

fn default_mount_storage() -> bool {
    true
}
fn default_mount_device() -> String {
    "/dev/sda1".to_string()
}
fn default_mount_fs_type() -> String {
    "vfat".to_string()
}
fn default_use_sudo() -> bool {
    true
}
fn default_shutdown_command() -> Vec<String> {
    vec![
        "sudo".to_string(),
        "shutdown".to_string(),
        "now".to_string(),
    ]
}
fn default_idle_tick_ms() -> u64 {
    50
}

fn default_buttons() -> Vec<ButtonConfig> {
    vec![
        ButtonConfig {
            rect: (0, 0, 50, 50),
            icon: Some("go".to_string()),
            action: Some(ButtonAction::StartRecording),
            param: None,
        },
        ButtonConfig {
            rect: (270, 0, 50, 50),
            icon: Some("shutdown".to_string()),
            action: Some(ButtonAction::Shutdown),
            param: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = DashcamConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.camera.resolution, (320, 240));
        assert_eq!(config.recording.segment_duration_ms, 15_000);
        assert_eq!(config.recording.segment_wrap, 135);
        assert_eq!(config.battery.gpio_pin, 21);
        assert_eq!(config.buttons.len(), 2);
        assert_eq!(config.buttons[0].action, Some(ButtonAction::StartRecording));
        assert_eq!(config.buttons[1].action, Some(ButtonAction::Shutdown));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let config = DashcamConfig::load_from_file(&path).unwrap();

        assert_eq!(config.camera.backend, CameraBackendKind::Gstreamer);
        assert_eq!(config.display.framebuffer_device, "/dev/fb1");
        assert_eq!(config.gps.port, 2947);
        assert_eq!(config.system.shutdown_command, default_shutdown_command());
        assert_eq!(config.buttons, default_buttons());
    }

    #[test]
    fn test_load_from_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashcam.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[camera]
backend = "test_pattern"
resolution = [640, 480]

[recording]
segment_wrap = 4
extra_args = []

[system]
shutdown_command = []

[[buttons]]
rect = [10, 10, 40, 40]
action = "no_op"
param = "hello"
"#
        )
        .unwrap();

        let config = DashcamConfig::load_from_file(&path).unwrap();

        assert_eq!(config.camera.backend, CameraBackendKind::TestPattern);
        assert_eq!(config.camera.resolution, (640, 480));
        assert_eq!(config.recording.segment_wrap, 4);
        assert!(config.recording.extra_args.is_empty());
        assert!(config.system.shutdown_command.is_empty());
        assert_eq!(config.buttons.len(), 1);
        assert_eq!(config.buttons[0].action, Some(ButtonAction::NoOp));
        assert_eq!(config.buttons[0].param.as_deref(), Some("hello"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = DashcamConfig::default();

        config.camera.resolution = (0, 0);
        assert!(config.validate().is_err());
        config.camera.resolution = (321, 240);
        assert!(config.validate().is_err());
        config.camera.resolution = (320, 240);
        assert!(config.validate().is_ok());

        config.camera.crop = (0.5, 0.0, 0.75, 1.0);
        assert!(config.validate().is_err());
        config.camera.crop = (0.0, 0.0, 0.0, 1.0);
        assert!(config.validate().is_err());
        config.camera.crop = (0.25, 0.25, 0.5, 0.5);
        assert!(config.validate().is_ok());

        config.recording.segment_wrap = 0;
        assert!(config.validate().is_err());
        config.recording.segment_wrap = 135;

        config.buttons[0].rect = (0, 0, 0, 50);
        assert!(config.validate().is_err());
        config.buttons.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_config_serializes_to_toml() {
        let rendered = toml::to_string_pretty(&DashcamConfig::default()).unwrap();

        assert!(rendered.contains("[recording]"));
        assert!(rendered.contains("segment_wrap = 135"));
        assert!(rendered.contains("[[buttons]]"));
        assert!(rendered.contains("action = \"start_recording\""));
    }
}
