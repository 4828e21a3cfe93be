//! Camera types and data structures.

use std::fmt;
use std::time::Instant;

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

/// Camera resolution hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Low resolution (320x240) - fast preview
    pub const LOW: Resolution = Resolution {
        width: 320,
        height: 240,
    };

    /// Medium resolution (640x480) - balanced, recommended
    pub const MEDIUM: Resolution = Resolution {
        width: 640,
        height: 480,
    };

    /// High resolution (1280x720) - for legible label text
    pub const HIGH: Resolution = Resolution {
        width: 1280,
        height: 720,
    };
}

impl Default for Resolution {
    fn default() -> Self {
        // Scanned frames feed text extraction, so default high.
        Self::HIGH
    }
}

/// Which camera the session should prefer.
///
/// Mirrors the facing preference of the mobile web platform the original
/// client ran on; on desktop hardware each value resolves to a configured
/// device index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// Rear camera, pointed at the item being scanned.
    Environment,
    /// Front camera.
    User,
}

impl Facing {
    pub fn opposite(&self) -> Facing {
        match self {
            Facing::Environment => Facing::User,
            Facing::User => Facing::Environment,
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Facing::Environment => f.write_str("environment"),
            Facing::User => f.write_str("user"),
        }
    }
}

/// Pixel format of a captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// RGB format (3 bytes per pixel)
    Rgb,
}

/// A captured camera frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw pixel data in RGB format
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel format
    pub format: FrameFormat,
    /// Timestamp when frame was captured
    pub timestamp: Instant,
}

impl Frame {
    /// Get the number of bytes per pixel (3 for RGB).
    pub fn bytes_per_pixel(&self) -> usize {
        match self.format {
            FrameFormat::Rgb => 3,
        }
    }
}

/// Errors that can occur during capture operations.
#[derive(Debug)]
pub enum CaptureError {
    /// No capture capability: device query failed or the requested device
    /// does not exist
    DeviceUnavailable(String),
    /// Camera permission denied by the platform
    PermissionDenied,
    /// Device exists but the stream could not be acquired
    AcquisitionFailed(String),
    /// A frame was requested while no stream is active
    NoActiveStream,
    /// The captured frame could not be encoded to a still image
    EncodingFailed(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::DeviceUnavailable(msg) => {
                write!(f, "No camera available: {}", msg)
            }
            CaptureError::PermissionDenied => {
                write!(
                    f,
                    "Camera permission denied. On macOS, grant access in System Settings > Privacy & Security > Camera"
                )
            }
            CaptureError::AcquisitionFailed(msg) => {
                write!(f, "Failed to acquire camera stream: {}", msg)
            }
            CaptureError::NoActiveStream => {
                write!(f, "No active camera stream. Start the capture session first")
            }
            CaptureError::EncodingFailed(msg) => {
                write!(f, "Failed to encode captured frame: {}", msg)
            }
        }
    }
}

impl std::error::Error for CaptureError {}
