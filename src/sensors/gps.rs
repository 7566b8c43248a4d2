use crate::error::SensorError;
use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use serde::Deserialize;
use std::fmt;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const WATCH_COMMAND: &[u8] = b"?WATCH={\"enable\":true,\"json\":true};\n";
const READ_TIMEOUT: Duration = Duration::from_secs(1);
const RECONNECT_DELAY: Duration = Duration::from_millis(500);

/// One JSON report from gpsd; only the fields used for annotation are decoded
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GpsReport {
    pub class: String,
    #[serde(default)]
    pub mode: Option<u8>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl GpsReport {
    pub fn parse(line: &str) -> Result<Self, SensorError> {
        serde_json::from_str(line).map_err(|e| SensorError::unavailable("gps", e))
    }

    pub fn is_position_report(&self) -> bool {
        self.class == "TPV"
    }

    /// A position report carrying both coordinates
    pub fn fix(&self) -> Option<GpsFix> {
        if !self.is_position_report() {
            return None;
        }
        match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => Some(GpsFix {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
}

/// Result of a bounded fix query
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GpsReading {
    Fix(GpsFix),
    Unavailable,
}

impl GpsReading {
    pub fn is_fix(&self) -> bool {
        matches!(self, GpsReading::Fix(_))
    }
}

/// Annotation text attached to a recorded segment
impl fmt::Display for GpsReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpsReading::Fix(fix) => write!(f, "({}, {})", fix.latitude, fix.longitude),
            GpsReading::Unavailable => write!(f, "No GPS"),
        }
    }
}

/// Blocking producer of gpsd reports.
///
/// `Ok(None)` means nothing arrived within the source's own read window.
pub trait LocationSource: Send {
    fn next_report(&mut self) -> Result<Option<GpsReport>, SensorError>;
}

/// TCP session with a gpsd daemon in JSON watch mode
pub struct GpsdSession {
    address: String,
    reader: Option<BufReader<TcpStream>>,
    failures: u32,
}

impl GpsdSession {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            address: format!("{}:{}", host, port),
            reader: None,
            failures: 0,
        }
    }

    fn connect(&self) -> Result<BufReader<TcpStream>, SensorError> {
        let mut stream =
            TcpStream::connect(&self.address).map_err(|e| SensorError::unavailable("gps", e))?;
        stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .map_err(|e| SensorError::unavailable("gps", e))?;
        stream
            .write_all(WATCH_COMMAND)
            .map_err(|e| SensorError::unavailable("gps", e))?;

        info!("Connected to gpsd at {}", self.address);
        Ok(BufReader::new(stream))
    }

    fn backoff(&self) -> Duration {
        RECONNECT_DELAY * 2_u32.pow(self.failures.min(5))
    }
}

impl LocationSource for GpsdSession {
    fn next_report(&mut self) -> Result<Option<GpsReport>, SensorError> {
        if self.reader.is_none() {
            match self.connect() {
                Ok(reader) => {
                    self.reader = Some(reader);
                    self.failures = 0;
                }
                Err(e) => {
                    let delay = self.backoff();
                    self.failures += 1;
                    thread::sleep(delay);
                    return Err(e);
                }
            }
        }

        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };

        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => {
                self.reader = None;
                Err(SensorError::unavailable("gps", "gpsd closed the connection"))
            }
            Ok(_) => match GpsReport::parse(line.trim()) {
                Ok(report) => Ok(Some(report)),
                Err(e) => {
                    debug!("Skipping unparseable gpsd line: {}", e);
                    Ok(None)
                }
            },
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(None),
            Err(e) => {
                self.reader = None;
                Err(SensorError::unavailable("gps", e))
            }
        }
    }
}

/// Keeps the most recent fix from a background reader available for
/// time-bounded queries.
pub struct GpsPoller {
    latest: Option<Receiver<GpsFix>>,
    query_timeout: Duration,
    stop: Arc<AtomicBool>,
}

impl GpsPoller {
    /// Start a reader thread pulling reports from `source`
    pub fn spawn(
        mut source: Box<dyn LocationSource>,
        query_timeout: Duration,
    ) -> Result<Self, SensorError> {
        let (tx, rx) = bounded::<GpsFix>(1);
        let stale = rx.clone();
        let stop = Arc::new(AtomicBool::new(false));
        let reader_stop = Arc::clone(&stop);

        thread::Builder::new()
            .name("gps-reader".to_string())
            .spawn(move || {
                debug!("GPS reader started");
                while !reader_stop.load(Ordering::Acquire) {
                    match source.next_report() {
                        Ok(Some(report)) if report.is_position_report() => match report.fix() {
                            Some(fix) => {
                                if !publish(&tx, &stale, fix) {
                                    break;
                                }
                            }
                            None => {
                                // Fix lost; drop whatever is buffered
                                let _ = stale.try_recv();
                            }
                        },
                        Ok(_) => {}
                        Err(e) => {
                            warn!("GPS read failed: {}", e);
                            let _ = stale.try_recv();
                        }
                    }
                }
                debug!("GPS reader stopped");
            })
            .map_err(|e| SensorError::unavailable("gps", e))?;

        Ok(Self {
            latest: Some(rx),
            query_timeout,
            stop,
        })
    }

    /// Poller that always reports no fix
    pub fn disabled() -> Self {
        Self {
            latest: None,
            query_timeout: Duration::ZERO,
            stop: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Current fix, waiting at most the query timeout for one to arrive
    pub fn latest_fix(&self) -> GpsReading {
        let Some(latest) = &self.latest else {
            return GpsReading::Unavailable;
        };

        let started = Instant::now();
        match latest.recv_timeout(self.query_timeout) {
            Ok(fix) => {
                debug!("GPS fix after {:?}: {:?}", started.elapsed(), fix);
                GpsReading::Fix(fix)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                GpsReading::Unavailable
            }
        }
    }
}

impl Drop for GpsPoller {
    fn drop(&mut self) {
        // The reader notices within one read window and exits on its own
        self.stop.store(true, Ordering::Release);
    }
}

/// Replace the buffered fix with `fix`. Returns false once the poller is gone.
fn publish(tx: &Sender<GpsFix>, stale: &Receiver<GpsFix>, fix: GpsFix) -> bool {
    let mut pending = fix;
    loop {
        match tx.try_send(pending) {
            Ok(()) => return true,
            Err(TrySendError::Full(value)) => {
                let _ = stale.try_recv();
                pending = value;
            }
            Err(TrySendError::Disconnected(_)) => return false,
        }
    }
}
