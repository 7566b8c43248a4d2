use super::backend::{CropRect, Resolution};

/// Build the GStreamer launch line for I420 preview capture
pub fn pipeline_description(source: &str, resolution: Resolution, crop: CropRect) -> String {
    let (width, height) = resolution;

    let mut desc = format!(
        "{} ! videoconvert ! videoscale ! video/x-raw,format=I420,width={},height={}",
        source, width, height
    );

    if !crop.is_full() {
        let (left, right, top, bottom) = crop.edges_in_pixels(width, height);
        desc.push_str(&format!(
            " ! videocrop left={} right={} top={} bottom={} ! \
             videoscale ! video/x-raw,format=I420,width={},height={}",
            left, right, top, bottom, width, height
        ));
    }

    desc.push_str(
        " ! appsink name=sink sync=false max-buffers=1 drop=true \
         enable-last-sample=false emit-signals=false",
    );

    desc
}

#[cfg(all(target_os = "linux", feature = "camera"))]
pub use gst::GstreamerCamera;

#[cfg(all(target_os = "linux", feature = "camera"))]
mod gst {
    use super::pipeline_description;
    use crate::camera::backend::{CameraBackend, CropRect, Resolution};
    use crate::error::CameraError;
    use gstreamer::prelude::*;
    use gstreamer::Pipeline;
    use gstreamer_app::AppSink;
    use gstreamer_video::{VideoFrame, VideoInfo};
    use std::time::Duration;
    use tracing::{debug, info, warn};

    /// GStreamer-based camera capture
    pub struct GstreamerCamera {
        source: String,
        capture_timeout: Duration,
        pipeline: Option<Pipeline>,
        appsink: Option<AppSink>,
    }

    impl GstreamerCamera {
        pub fn new(source: impl Into<String>, capture_timeout: Duration) -> Result<Self, CameraError> {
            gstreamer::init().map_err(|e| CameraError::Configuration {
                details: format!("Failed to initialize GStreamer: {}", e),
            })?;

            Ok(Self {
                source: source.into(),
                capture_timeout,
                pipeline: None,
                appsink: None,
            })
        }
    }

    impl CameraBackend for GstreamerCamera {
        fn open(&mut self, resolution: Resolution, crop: CropRect) -> Result<(), CameraError> {
            let desc = pipeline_description(&self.source, resolution, crop);
            info!("Creating GStreamer pipeline: {}", desc);

            let pipeline = gstreamer::parse::launch(&desc)
                .map_err(|e| CameraError::Open {
                    details: format!("Failed to create pipeline: {}", e),
                })?
                .downcast::<Pipeline>()
                .map_err(|_| CameraError::Open {
                    details: "Failed to downcast to Pipeline".to_string(),
                })?;

            let appsink = pipeline
                .by_name("sink")
                .ok_or_else(|| CameraError::Open {
                    details: "Failed to get appsink element".to_string(),
                })?
                .downcast::<AppSink>()
                .map_err(|_| CameraError::Open {
                    details: "Failed to downcast to AppSink".to_string(),
                })?;

            if let Err(e) = pipeline.set_state(gstreamer::State::Playing) {
                let _ = pipeline.set_state(gstreamer::State::Null);
                return Err(CameraError::Open {
                    details: format!("Failed to start pipeline: {}", e),
                });
            }

            self.pipeline = Some(pipeline);
            self.appsink = Some(appsink);
            Ok(())
        }

        fn capture(&mut self) -> Result<Vec<u8>, CameraError> {
            let appsink = self.appsink.as_ref().ok_or(CameraError::NotAcquired)?;

            let timeout = gstreamer::ClockTime::from_mseconds(self.capture_timeout.as_millis() as u64);
            let sample = appsink
                .try_pull_sample(timeout)
                .ok_or_else(|| CameraError::Capture {
                    details: format!("No frame within {:?}", self.capture_timeout),
                })?;

            let caps = sample.caps().ok_or_else(|| CameraError::Capture {
                details: "No caps in sample".to_string(),
            })?;
            let info = VideoInfo::from_caps(caps).map_err(|e| CameraError::Capture {
                details: format!("Failed to get video info: {}", e),
            })?;
            let buffer = sample.buffer_owned().ok_or_else(|| CameraError::Capture {
                details: "No buffer in sample".to_string(),
            })?;
            let frame = VideoFrame::from_buffer_readable(buffer, &info).map_err(|_| {
                CameraError::Capture {
                    details: "Failed to map video frame".to_string(),
                }
            })?;

            // Repack the planes without stride padding
            let width = info.width() as usize;
            let height = info.height() as usize;
            let mut data = Vec::with_capacity(width * height * 3 / 2);
            for plane in 0..3u32 {
                let (plane_width, plane_height) = if plane == 0 {
                    (width, height)
                } else {
                    (width / 2, height / 2)
                };
                let stride = frame.plane_stride()[plane as usize] as usize;
                let bytes = frame.plane_data(plane).map_err(|e| CameraError::Capture {
                    details: format!("Failed to read plane {}: {}", plane, e),
                })?;
                for row in 0..plane_height {
                    let start = row * stride;
                    data.extend_from_slice(&bytes[start..start + plane_width]);
                }
            }

            Ok(data)
        }

        fn close(&mut self) {
            self.appsink = None;
            if let Some(pipeline) = self.pipeline.take() {
                match pipeline.set_state(gstreamer::State::Null) {
                    Ok(_) => debug!("GStreamer pipeline stopped"),
                    Err(e) => warn!("Failed to stop GStreamer pipeline: {}", e),
                }
            }
        }

        fn paces_capture(&self) -> bool {
            true
        }

        fn name(&self) -> &'static str {
            "gstreamer"
        }
    }

    impl Drop for GstreamerCamera {
        fn drop(&mut self) {
            self.close();
        }
    }
}
