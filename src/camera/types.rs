//! Camera types: frames, settings, and errors.

use std::fmt;

use thiserror::Error;

/// Information about an available camera device.
#[derive(Debug, Clone)]
pub struct CameraInfo {
    /// Device index for selection
    pub index: u32,
    /// Human-readable device name
    pub name: String,
    /// Device description
    pub description: String,
}

impl fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.index, self.name, self.description)
    }
}

/// A captured camera frame: packed RGB, 3 bytes per pixel, row-major.
///
/// Frames are replaced wholesale each cycle; nothing mutates a frame
/// after the mirror/contrast pre-filters have run.
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub const BYTES_PER_PIXEL: usize = 3;

    /// Expected buffer length for the frame dimensions.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * Self::BYTES_PER_PIXEL
    }
}

/// Settings requested from the capture device at session start.
///
/// These are hints; the device may grant a different format.
#[derive(Debug, Clone, Copy)]
pub struct CameraSettings {
    /// Camera device index
    pub device_index: u32,
    /// Requested capture width in pixels
    pub width: u32,
    /// Requested capture height in pixels
    pub height: u32,
    /// Requested frame rate
    pub fps: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device_index: 0,
            width: 1280,
            height: 720,
            fps: 30,
        }
    }
}

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    /// No cameras found on the system
    #[error("no cameras found")]
    NoDevices,
    /// Failed to query camera devices
    #[error("failed to query cameras: {0}")]
    QueryFailed(String),
    /// Camera device not found at the specified index
    #[error("camera {0} not found")]
    DeviceNotFound(u32),
    /// Failed to open the camera
    #[error("failed to open camera: {0}")]
    OpenFailed(String),
    /// Failed to start or read from the video stream
    #[error("camera stream failed: {0}")]
    StreamFailed(String),
    /// A frame arrived but could not be decoded to RGB
    #[error("failed to decode camera frame")]
    DecodeFailed,
}
