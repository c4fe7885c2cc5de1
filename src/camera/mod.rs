//! Camera module: webcam access and frame capture.
//!
//! The session talks to the camera only through the [`FrameSource`]
//! trait, so the interactive loop can be exercised in tests with a
//! scripted source instead of real hardware.

mod device;
mod frame_utils;
mod source;
mod types;

pub use device::list_devices;
pub use frame_utils::{apply_contrast, convert_to_rgb, mirror_horizontal};
pub use source::CameraSource;
pub use types::{CameraError, CameraInfo, CameraSettings, Frame};

/// Boundary to the capture device.
///
/// `read` yields one frame per call. `Ok(None)` means the stream has
/// ended; an error means the source failed. `release` frees the device
/// and must be safe to call more than once.
pub trait FrameSource {
    fn read(&mut self) -> Result<Option<Frame>, CameraError>;
    fn release(&mut self);
}
