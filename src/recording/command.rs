use crate::config::RecordingConfig;
use crate::error::RecordingError;
use std::path::Path;
use std::process::Command;
use std::time::Duration;
use tracing::debug;

/// Records one fixed-length segment to `path`, blocking until it is written
pub trait SegmentRecorder: Send + Sync {
    fn record(&self, path: &Path, duration: Duration, gps_tag: &str)
        -> Result<(), RecordingError>;
}

/// Segment capture through an external camera command
/// (`<program> -o <path> -t <ms> <extra args> -a <tag>`)
#[derive(Debug, Clone)]
pub struct CommandRecorder {
    program: String,
    extra_args: Vec<String>,
}

impl CommandRecorder {
    pub fn new<S: Into<String>>(program: S, extra_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            extra_args,
        }
    }

    pub fn from_config(config: &RecordingConfig) -> Self {
        Self::new(config.command.clone(), config.extra_args.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self, path: &Path, duration: Duration, gps_tag: &str) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            path.to_string_lossy().into_owned(),
            "-t".to_string(),
            duration.as_millis().to_string(),
        ];
        args.extend(self.extra_args.iter().cloned());
        args.push("-a".to_string());
        args.push(gps_tag.to_string());
        args
    }
}

impl SegmentRecorder for CommandRecorder {
    fn record(
        &self,
        path: &Path,
        duration: Duration,
        gps_tag: &str,
    ) -> Result<(), RecordingError> {
        let args = self.args(path, duration, gps_tag);
        debug!("Running {} {:?}", self.program, args);

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|e| RecordingError::SegmentCapture {
                path: path.display().to_string(),
                details: format!("failed to launch {}: {}", self.program, e),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(RecordingError::SegmentCapture {
                path: path.display().to_string(),
                details: format!("{} exited with {}", self.program, status),
            })
        }
    }
}
