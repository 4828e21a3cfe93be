//! Camera capture module for the scan flow.
//!
//! This module provides the device side of the capture-to-inventory
//! pipeline:
//! - Device enumeration via [`list_devices`]
//! - Stream lifecycle via [`CaptureSession`]
//! - Configuration via [`Facing`] and [`Resolution`]

mod capture_loop;
mod device;
mod session;
mod types;

pub use device::list_devices;
pub use session::{CaptureSession, SessionState};
pub use types::{CameraInfo, CaptureError, Facing, Frame, FrameFormat, Resolution};
