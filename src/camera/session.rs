//! Capture session lifecycle.
//!
//! A [`CaptureSession`] owns the device camera for the scan flow: it is the
//! only component that acquires, switches, and releases the underlying
//! stream. The stream itself lives in a background thread (see
//! `capture_loop`); the session holds the only stop-signal/join-handle pair
//! for that thread, so releasing the handle is guaranteed on every exit
//! path out of `Active`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use super::capture_loop::{run_capture_loop, CaptureCommand, LoopSettings};
use super::device::list_devices;
use super::types::{CaptureError, Facing, Frame, Resolution};
use crate::config::CameraConfig;
use crate::encoder::{encode_frame, EncodedImage};

/// Target frame rate requested from the device.
const TARGET_FPS: u32 = 30;

/// How long `capture_frame` waits for the first decoded frame.
const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(2);

/// Poll interval while waiting for a frame.
const FRAME_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Lifecycle state of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No stream held.
    Idle,
    /// A stream is held and frames are arriving.
    Active,
    /// The last acquisition attempt failed; no stream held.
    Error,
}

/// Exclusive handle on a running capture stream.
///
/// Exists only while the session is `Active`; dropping it through
/// `CaptureSession::release` stops the capture thread and with it the
/// device stream.
struct StreamHandle {
    frame_buffer: Arc<Mutex<Option<Frame>>>,
    thread: JoinHandle<()>,
    command_tx: Sender<CaptureCommand>,
    stop_signal: Arc<AtomicBool>,
}

/// Device camera session for the scan flow.
pub struct CaptureSession {
    devices: CameraConfig,
    resolution: Resolution,
    facing: Facing,
    state: SessionState,
    stream: Option<StreamHandle>,
    /// Resolution the camera actually settled on, while active.
    actual_resolution: Option<Resolution>,
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("state", &self.state)
            .field("facing", &self.facing)
            .field("resolution", &self.resolution)
            .finish_non_exhaustive()
    }
}

impl CaptureSession {
    /// Create an idle session using the given device mapping.
    pub fn new(devices: CameraConfig, resolution: Resolution) -> Self {
        Self {
            devices,
            resolution,
            facing: Facing::Environment,
            state: SessionState::Idle,
            stream: None,
            actual_resolution: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The facing preference of the current (or last) acquisition.
    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Resolution the camera settled on, if a stream is active.
    pub fn actual_resolution(&self) -> Option<Resolution> {
        self.actual_resolution
    }

    fn device_for(&self, facing: Facing) -> u32 {
        match facing {
            Facing::Environment => self.devices.environment_device,
            Facing::User => self.devices.user_device,
        }
    }

    /// Acquire a stream with the given facing preference.
    ///
    /// Any stream already held is released first, so the at-most-one-stream
    /// invariant holds even when `start` is called while active. On failure
    /// the session transitions to `Error` with nothing acquired; the caller
    /// decides whether to retry.
    pub fn start(&mut self, facing: Facing) -> Result<(), CaptureError> {
        self.release();
        self.facing = facing;

        match self.acquire(facing) {
            Ok(handle) => {
                self.stream = Some(handle);
                self.state = SessionState::Active;
                log::info!(
                    "Camera stream active (facing {}, {:?})",
                    facing,
                    self.actual_resolution
                );
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Error;
                log::warn!("Camera acquisition failed: {}", e);
                Err(e)
            }
        }
    }

    /// Release the current stream and reacquire with the opposite facing.
    ///
    /// A failed reacquisition leaves the session in `Error` and surfaces
    /// the failure; it never silently keeps the old stream.
    pub fn switch_facing(&mut self) -> Result<(), CaptureError> {
        let target = self.facing.opposite();
        self.start(target)
    }

    /// Release the held stream unconditionally and return to `Idle`.
    ///
    /// Safe to call when already idle.
    pub fn stop(&mut self) {
        self.release();
        self.state = SessionState::Idle;
    }

    /// Capture the current frame as an encoded still image.
    ///
    /// Valid only while `Active`. The stream is released before this
    /// returns, on success and on failure alike, so the session is always
    /// back in a retryable state afterwards.
    pub fn capture_frame(&mut self) -> Result<EncodedImage, CaptureError> {
        if self.state != SessionState::Active {
            return Err(CaptureError::NoActiveStream);
        }

        let frame = self.wait_for_frame();
        // Transition out of Active releases the stream before anything else
        self.stop();

        let frame = frame.ok_or_else(|| {
            CaptureError::AcquisitionFailed("no frame received from camera".to_string())
        })?;

        encode_frame(&frame).map_err(|e| CaptureError::EncodingFailed(e.to_string()))
    }

    fn wait_for_frame(&self) -> Option<Frame> {
        let handle = self.stream.as_ref()?;
        let deadline = Instant::now() + FIRST_FRAME_TIMEOUT;

        loop {
            if let Ok(buf) = handle.frame_buffer.lock() {
                if let Some(frame) = buf.clone() {
                    return Some(frame);
                }
            }
            if Instant::now() >= deadline {
                return None;
            }
            std::thread::sleep(FRAME_POLL_INTERVAL);
        }
    }

    /// Spawn the capture thread and wait for it to report readiness.
    fn acquire(&mut self, facing: Facing) -> Result<StreamHandle, CaptureError> {
        let device_index = self.device_for(facing);

        let devices = list_devices()?;
        if devices.is_empty() {
            return Err(CaptureError::DeviceUnavailable(
                "no camera devices found".to_string(),
            ));
        }
        if !devices.iter().any(|d| d.index == device_index) {
            return Err(CaptureError::DeviceUnavailable(format!(
                "device {} (facing {}) not found",
                device_index, facing
            )));
        }

        let settings = LoopSettings {
            device_index,
            resolution: self.resolution,
            fps: TARGET_FPS,
            mirror: facing == Facing::User,
        };

        let frame_buffer = Arc::new(Mutex::new(None));
        let stop_signal = Arc::new(AtomicBool::new(false));
        let (command_tx, command_rx) = mpsc::channel();
        let (info_tx, info_rx) = mpsc::channel::<Result<Resolution, CaptureError>>();

        let buffer = Arc::clone(&frame_buffer);
        let stop = Arc::clone(&stop_signal);
        let thread = std::thread::spawn(move || {
            run_capture_loop(settings, buffer, stop, command_rx, info_tx);
        });

        match info_rx.recv() {
            Ok(Ok(actual)) => {
                self.actual_resolution = Some(actual);
                Ok(StreamHandle {
                    frame_buffer,
                    thread,
                    command_tx,
                    stop_signal,
                })
            }
            Ok(Err(e)) => {
                // The thread failed before opening a stream; reap it
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(CaptureError::AcquisitionFailed(
                    "capture thread terminated unexpectedly".to_string(),
                ))
            }
        }
    }

    /// Stop the capture thread and drop the stream handle, if any.
    fn release(&mut self) {
        if let Some(handle) = self.stream.take() {
            handle.stop_signal.store(true, Ordering::SeqCst);
            // Also send a stop command in case the thread is blocked
            let _ = handle.command_tx.send(CaptureCommand::Stop);
            let _ = handle.thread.join();
        }
        self.actual_resolution = None;
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle_session() -> CaptureSession {
        CaptureSession::new(CameraConfig::default(), Resolution::default())
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = idle_session();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.facing(), Facing::Environment);
        assert!(session.actual_resolution().is_none());
    }

    #[test]
    fn test_capture_frame_while_idle_fails_and_stays_idle() {
        let mut session = idle_session();
        let result = session.capture_frame();
        assert!(matches!(result, Err(CaptureError::NoActiveStream)));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_stop_twice_is_a_noop() {
        let mut session = idle_session();
        session.stop();
        session.stop();
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_start_with_missing_device_enters_error_state() {
        let devices = CameraConfig {
            environment_device: 999,
            user_device: 998,
        };
        let mut session = CaptureSession::new(devices, Resolution::default());
        // Fails whether the host has no cameras at all or simply no device 999
        let result = session.start(Facing::Environment);
        assert!(result.is_err());
        assert_eq!(session.state(), SessionState::Error);

        // Error state holds no stream; capture is a sequencing error
        assert!(matches!(
            session.capture_frame(),
            Err(CaptureError::NoActiveStream)
        ));

        // stop() recovers to Idle
        session.stop();
        assert_eq!(session.state(), SessionState::Idle);
    }
}
