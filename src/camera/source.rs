//! Synchronous webcam frame source.
//!
//! The session loop is single-threaded and cooperative, so the camera
//! is read directly on the session thread: one `Camera::frame()` call
//! per cycle, no background capture thread. A hung device therefore
//! stalls the whole session; the key-poll timeout is the only pacing.

use log::{debug, info};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat as NokhwaFrameFormat, RequestedFormat,
    RequestedFormatType, Resolution,
};
use nokhwa::Camera;

use super::device::list_devices;
use super::frame_utils::convert_to_rgb;
use super::types::{CameraError, CameraSettings, Frame};
use super::FrameSource;

/// A webcam wrapped as a [`FrameSource`].
pub struct CameraSource {
    camera: Camera,
    streaming: bool,
}

impl CameraSource {
    /// Open the camera described by `settings` and start its stream.
    ///
    /// The requested resolution and frame rate are hints; the device may
    /// grant the closest format it supports.
    ///
    /// # Errors
    /// * `CameraError::NoDevices` - no camera is attached at all
    /// * `CameraError::DeviceNotFound` - the requested index does not exist
    /// * `CameraError::OpenFailed` / `CameraError::StreamFailed` - the
    ///   device refused to open or start streaming
    pub fn open(settings: CameraSettings) -> Result<Self, CameraError> {
        let devices = list_devices()?;
        if devices.is_empty() {
            return Err(CameraError::NoDevices);
        }
        if !devices.iter().any(|d| d.index == settings.device_index) {
            return Err(CameraError::DeviceNotFound(settings.device_index));
        }

        let index = CameraIndex::Index(settings.device_index);
        let mut camera = open_with_fallback(&index, settings)?;
        camera
            .open_stream()
            .map_err(|e| CameraError::StreamFailed(e.to_string()))?;

        let granted = camera.resolution();
        info!(
            "camera {} open at {}x{} @ {} fps",
            settings.device_index,
            granted.width(),
            granted.height(),
            camera.frame_rate()
        );

        Ok(Self {
            camera,
            streaming: true,
        })
    }
}

/// Open the device, trying format strategies in order of preference:
/// NV12 (native on macOS), then MJPEG (widely supported), then whatever
/// the camera itself considers best.
fn open_with_fallback(index: &CameraIndex, settings: CameraSettings) -> Result<Camera, CameraError> {
    let resolution = Resolution::new(settings.width, settings.height);
    let format_attempts: Vec<RequestedFormat> = vec![
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            resolution,
            NokhwaFrameFormat::NV12,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            resolution,
            NokhwaFrameFormat::MJPEG,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution),
    ];

    let mut last_error = None;
    for requested in format_attempts {
        match Camera::new(index.clone(), requested) {
            Ok(camera) => return Ok(camera),
            Err(e) => last_error = Some(e),
        }
    }

    // All strategies failed; last_error is necessarily set
    Err(CameraError::OpenFailed(last_error.unwrap().to_string()))
}

impl FrameSource for CameraSource {
    fn read(&mut self) -> Result<Option<Frame>, CameraError> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| CameraError::StreamFailed(e.to_string()))?;
        match convert_to_rgb(&buffer) {
            Some(frame) => Ok(Some(frame)),
            None => Err(CameraError::DecodeFailed),
        }
    }

    fn release(&mut self) {
        if self.streaming {
            self.streaming = false;
            let _ = self.camera.stop_stream();
            debug!("camera stream stopped");
        }
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        self.release();
    }
}
